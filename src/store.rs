//! Persistence for the task list
//!
//! The whole list is one serialized blob under one well-known key. Every
//! save replaces the blob wholesale; there are no partial writes.
//!
//! ```text
//! <data dir>/
//!   tasks.json                          # pretty JSON array of tasks
//!   tasks.json.corrupt-20240105T101500Z # raw bytes of a file that failed to parse
//! ```

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::de::Error as _;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::task::Task;

/// Key the task list is stored under in key-value backends.
pub const TASKS_KEY: &str = "tasks";

/// Default file name for [`JsonFileStore`].
pub const TASKS_FILE: &str = "tasks.json";

/// Durable home of the serialized task list.
///
/// Implementations must replace the stored list atomically from the caller's
/// point of view, so repeated saves are idempotent and the last one wins.
pub trait TaskStore {
    /// Returns the stored list, or an empty list when nothing was saved yet.
    fn load(&self) -> Result<Vec<Task>>;

    /// Overwrites the stored list with `tasks`.
    fn save(&self, tasks: &[Task]) -> Result<()>;
}

impl<S: TaskStore + ?Sized> TaskStore for &S {
    fn load(&self) -> Result<Vec<Task>> {
        (**self).load()
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        (**self).save(tasks)
    }
}

/// Blank input counts as "nothing stored". A list that repeats an id is
/// rejected like any other unreadable content.
fn decode(raw: &[u8]) -> serde_json::Result<Vec<Task>> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let tasks: Vec<Task> = serde_json::from_slice(raw)?;
    let mut seen = HashSet::with_capacity(tasks.len());
    if let Some(dup) = tasks.iter().find(|t| !seen.insert(&t.id)) {
        return Err(serde_json::Error::custom(format!(
            "duplicate task id {:?}",
            dup.id.as_str()
        )));
    }
    Ok(tasks)
}

/// Task list kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/tasks.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(TASKS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt_backup_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| TASKS_FILE.to_string());
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        self.path.with_file_name(format!("{name}.corrupt-{stamp}"))
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Task>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no task file yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        match decode(&raw) {
            Ok(tasks) => {
                debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
                Ok(tasks)
            }
            Err(source) => {
                let backup = self.corrupt_backup_path();
                fs::write(&backup, &raw)?;
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    error = %source,
                    "task file failed to parse; kept a copy"
                );
                Err(Error::CorruptStore {
                    location: self.path.display().to_string(),
                    backup: backup.display().to_string(),
                    source,
                })
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        let data = serde_json::to_vec_pretty(tasks)?;
        write_atomic(&self.path, &data)?;
        debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}

/// Write data atomically using temp file + rename
///
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    // Temp file must live in the same directory for the rename to be atomic
    let temp_path = path.with_extension(format!(
        "{}.tmp.{}",
        path.extension().and_then(|e| e.to_str()).unwrap_or(""),
        std::process::id()
    ));

    let written = File::create(&temp_path).and_then(|mut temp_file| {
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        drop(temp_file);
        fs::rename(&temp_path, path)
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(())
}

/// In-process key-value store holding the serialized list under [`TASKS_KEY`].
///
/// Goes through the same JSON codec as the file store. Saves can be made to
/// fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose task key already holds `raw`.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries().insert(TASKS_KEY.to_string(), raw.into());
        store
    }

    /// Makes every following `save` fail with an io error until reset.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Raw value stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Result<Vec<Task>> {
        let mut entries = self.entries();
        let Some(raw) = entries.get(TASKS_KEY) else {
            return Ok(Vec::new());
        };
        match decode(raw.as_bytes()) {
            Ok(tasks) => {
                debug!(key = TASKS_KEY, count = tasks.len(), "loaded tasks");
                Ok(tasks)
            }
            Err(source) => {
                let backup = format!("{TASKS_KEY}.corrupt");
                let raw = raw.clone();
                entries.insert(backup.clone(), raw);
                warn!(key = TASKS_KEY, error = %source, "stored tasks failed to parse; kept a copy");
                Err(Error::CorruptStore {
                    location: format!("memory:{TASKS_KEY}"),
                    backup: format!("memory:{backup}"),
                    source,
                })
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(io::Error::other("memory store rejected the write").into());
        }
        let raw = serde_json::to_string(tasks)?;
        self.entries().insert(TASKS_KEY.to_string(), raw);
        debug!(key = TASKS_KEY, count = tasks.len(), "saved tasks");
        Ok(())
    }
}
