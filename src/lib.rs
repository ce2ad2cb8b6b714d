//! taskdeck - a small to-do list
//!
//! Tasks carry a title, a category (work, personal, shopping, other), a due
//! date and a completion flag. The whole list is kept as one JSON blob; the
//! [`TaskList`] controller loads it once, serves filtered and sorted views
//! from memory and writes the full list back after every change.
//!
//! # Module Organization
//!
//! - `task`: the task record and its persisted layout
//! - `store`: the `TaskStore` trait with file and in-memory backends
//! - `task_list`: the controller (add, toggle, delete, filter, sort, counts)
//! - `sample`: demonstration tasks loaded on request
//! - `app` / `ui`: terminal front end
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `config.toml`
//! - `logging`: tracing subscribers for the CLI (stderr) and the UI (file)
//! - `error`: error types and result alias

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod sample;
pub mod store;
pub mod task;
pub mod task_list;
pub mod ui;

pub use error::{Error, Result};
pub use store::{JsonFileStore, MemoryStore, TaskStore};
pub use task::{Category, CategoryFilter, NewTask, Task, TaskId};
pub use task_list::{TaskCounts, TaskList};
