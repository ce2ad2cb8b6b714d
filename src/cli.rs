//! Command-line interface
//!
//! Every task list operation has a subcommand; with no subcommand the
//! terminal UI starts.

use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::JsonFileStore;
use crate::task::{parse_due_date, Category, CategoryFilter, NewTask, Task, TaskId};
use crate::task_list::TaskList;
use crate::ui;

/// taskdeck - a small to-do list
///
/// Tasks have a category (work, personal, shopping, other) and a due date,
/// and live in a single JSON file.
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Task file to read and write
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Category: work, personal, shopping, other
        #[arg(short, long, default_value = "other")]
        category: String,

        /// Due date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        due: Option<String>,

        /// Longer description
        #[arg(long)]
        description: Option<String>,
    },

    /// List tasks
    List {
        /// Category filter: all, work, personal, shopping, other
        #[arg(short, long)]
        category: Option<String>,

        /// Order by due date, earliest first
        #[arg(long)]
        sort_due: bool,
    },

    /// Flip a task between done and pending
    Toggle {
        /// Task id
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task id
        id: String,
    },

    /// Show total, completed and pending counts
    Stats,

    /// Add a handful of sample tasks
    Sample,

    /// Interactive terminal UI (default)
    Tui,
}

impl Cli {
    pub fn is_tui(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tui))
    }

    pub fn run(self, config: &Config) -> Result<()> {
        let store = JsonFileStore::new(config.data_file(self.data_file.as_deref())?);
        let json = self.json;

        match self.command.unwrap_or(Commands::Tui) {
            Commands::Tui => ui::run(store, config)?,
            Commands::Add {
                title,
                category,
                due,
                description,
            } => {
                let mut list = TaskList::open(store)?;
                let category: Category = category.parse()?;
                let due_date = match due {
                    Some(raw) => parse_due_date(&raw)?,
                    None => Local::now().date_naive(),
                };
                let mut draft = NewTask::new(title, category, due_date);
                draft.description = description;
                match list.add_task(draft)? {
                    Some(id) => print_id(&id, json),
                    None => eprintln!("Title is empty; nothing added."),
                }
            }
            Commands::List { category, sort_due } => {
                let mut list = TaskList::open(store)?;
                let filter = match category {
                    Some(raw) => raw.parse::<CategoryFilter>()?,
                    None => config.default_filter(),
                };
                list.set_filter(filter);
                list.set_sort_by_due_date(sort_due || config.view.sort_by_due_date);
                print_tasks(&list.derived_view(), json)?;
            }
            Commands::Toggle { id } => {
                let mut list = TaskList::open(store)?;
                let id = TaskId::from(id);
                if !list.toggle_completion(&id)? {
                    return Err(Error::TaskNotFound(id.to_string()));
                }
                let done = list.get(&id).is_some_and(|t| t.completed);
                if json {
                    println!("{}", serde_json::json!({ "id": id, "completed": done }));
                } else {
                    println!("{id} {}", if done { "done" } else { "pending" });
                }
            }
            Commands::Delete { id } => {
                let mut list = TaskList::open(store)?;
                let id = TaskId::from(id);
                let task = list
                    .delete_task(&id)?
                    .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
                if json {
                    println!("{}", serde_json::to_string(&task)?);
                } else {
                    println!("Deleted {}", task.title);
                }
            }
            Commands::Stats => {
                let list = TaskList::open(store)?;
                let counts = list.counts();
                if json {
                    println!("{}", serde_json::to_string(&counts)?);
                } else {
                    println!("Total:     {}", counts.total);
                    println!("Completed: {}", counts.completed);
                    println!("Pending:   {}", counts.pending);
                }
            }
            Commands::Sample => {
                let mut list = TaskList::open(store)?;
                let added = list.load_sample_data(Local::now().date_naive())?;
                println!("Added {added} sample tasks");
            }
        }
        Ok(())
    }
}

fn print_id(id: &TaskId, json: bool) {
    if json {
        println!("{}", serde_json::json!({ "id": id }));
    } else {
        println!("{id}");
    }
}

fn print_tasks(tasks: &[&Task], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
        return Ok(());
    }
    if tasks.is_empty() {
        println!("No tasks available");
        return Ok(());
    }
    for task in tasks {
        println!(
            "- [{}] {} {} ({}, due {})",
            if task.completed { 'x' } else { ' ' },
            task.id,
            task.title,
            task.category,
            task.due_date
        );
    }
    Ok(())
}
