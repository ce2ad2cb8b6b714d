//! Error types for taskdeck
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad category, bad date, unknown task, bad config)
//! - 4: Operation failed (io, serialization, corrupt task file)

use thiserror::Error;

/// Exit codes for the taskdeck binary
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Unknown category: {0} (expected work, personal, shopping or other)")]
    InvalidCategory(String),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored tasks at {location} are corrupt ({source}); raw contents kept at {backup}")]
    CorruptStore {
        location: String,
        backup: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not determine a data directory; pass --data-file")]
    NoDataDir,
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidCategory(_)
            | Error::InvalidDate(_)
            | Error::TaskNotFound(_)
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::CorruptStore { .. }
            | Error::NoDataDir => exit_codes::OPERATION_FAILED,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
