//! The task list controller
//!
//! Holds the working copy of the tasks, the active category filter and the
//! due-date sort toggle. Every mutation writes the whole list back through
//! the injected [`TaskStore`]; when that write fails the in-memory list is
//! restored so memory and storage never disagree.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::sample;
use crate::store::TaskStore;
use crate::task::{CategoryFilter, NewTask, Task, TaskId};

/// Aggregate counts shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskCounts {
    pub fn of<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let (total, completed) = tasks.into_iter().fold((0, 0), |(total, done), task| {
            (total + 1, done + usize::from(task.completed))
        });
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}

#[derive(Debug)]
pub struct TaskList<S: TaskStore> {
    store: S,
    tasks: Vec<Task>,
    filter: CategoryFilter,
    sort_by_due_date: bool,
}

impl<S: TaskStore> TaskList<S> {
    /// Loads the stored list. Any load error, corruption included, is returned.
    pub fn open(store: S) -> Result<Self> {
        let tasks = store.load()?;
        info!(count = tasks.len(), "task list opened");
        Ok(Self::with_tasks(store, tasks))
    }

    /// Like [`open`](Self::open), but a corrupt stored list yields an empty
    /// list plus the location where the unreadable data was kept.
    pub fn open_recovering(store: S) -> Result<(Self, Option<String>)> {
        match store.load() {
            Ok(tasks) => Ok((Self::with_tasks(store, tasks), None)),
            Err(Error::CorruptStore { backup, .. }) => {
                warn!(%backup, "starting with an empty task list");
                Ok((Self::with_tasks(store, Vec::new()), Some(backup)))
            }
            Err(err) => Err(err),
        }
    }

    fn with_tasks(store: S, tasks: Vec<Task>) -> Self {
        Self {
            store,
            tasks,
            filter: CategoryFilter::All,
            sort_by_due_date: false,
        }
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn sort_by_due_date(&self) -> bool {
        self.sort_by_due_date
    }

    /// Appends a task built from `draft` and persists.
    ///
    /// Returns `Ok(None)` without touching the store when the title is blank.
    pub fn add_task(&mut self, draft: NewTask) -> Result<Option<TaskId>> {
        let id = self.fresh_id();
        let Some(task) = draft.into_task(id.clone(), Utc::now()) else {
            debug!("ignoring task with blank title");
            return Ok(None);
        };
        let category = task.category;
        self.tasks.push(task);
        if let Err(err) = self.persist() {
            self.tasks.pop();
            return Err(err);
        }
        info!(%id, %category, "task added");
        Ok(Some(id))
    }

    /// Flips the completion flag of `id` and persists.
    ///
    /// Returns `Ok(false)` when no task has that id.
    pub fn toggle_completion(&mut self, id: &TaskId) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            debug!(%id, "toggle of unknown task ignored");
            return Ok(false);
        };
        task.toggle();
        let completed = task.completed;
        if let Err(err) = self.persist() {
            if let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) {
                task.toggle();
            }
            return Err(err);
        }
        info!(%id, completed, "task toggled");
        Ok(true)
    }

    /// Removes `id` and persists. Returns the removed task, if there was one.
    pub fn delete_task(&mut self, id: &TaskId) -> Result<Option<Task>> {
        let Some(index) = self.tasks.iter().position(|t| &t.id == id) else {
            debug!(%id, "delete of unknown task ignored");
            return Ok(None);
        };
        let task = self.tasks.remove(index);
        if let Err(err) = self.persist() {
            self.tasks.insert(index, task);
            return Err(err);
        }
        info!(%id, "task deleted");
        Ok(Some(task))
    }

    /// Appends the demonstration tasks, due from `today` on, and persists.
    /// Returns how many were added.
    pub fn load_sample_data(&mut self, today: NaiveDate) -> Result<usize> {
        let before = self.tasks.len();
        for draft in sample::sample_tasks(today) {
            let id = self.fresh_id();
            if let Some(task) = draft.into_task(id, Utc::now()) {
                self.tasks.push(task);
            }
        }
        if let Err(err) = self.persist() {
            self.tasks.truncate(before);
            return Err(err);
        }
        let added = self.tasks.len() - before;
        info!(added, "sample tasks loaded");
        Ok(added)
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        debug!(%filter, "filter changed");
        self.filter = filter;
    }

    /// Moves to the next filter in tab order and returns it.
    pub fn cycle_filter(&mut self) -> CategoryFilter {
        self.set_filter(self.filter.next());
        self.filter
    }

    pub fn set_sort_by_due_date(&mut self, enabled: bool) {
        debug!(enabled, "sort by due date changed");
        self.sort_by_due_date = enabled;
    }

    /// The tasks to display: filtered by category, then ordered by due date
    /// when sorting is on. Equal due dates keep insertion order.
    pub fn derived_view(&self) -> Vec<&Task> {
        let mut view: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| self.filter.matches(t))
            .collect();
        if self.sort_by_due_date {
            // sort_by_key is stable
            view.sort_by_key(|t| t.due_date);
        }
        view
    }

    /// Counts over every task, regardless of the active filter.
    pub fn counts(&self) -> TaskCounts {
        TaskCounts::of(&self.tasks)
    }

    fn fresh_id(&self) -> TaskId {
        loop {
            let id = TaskId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.tasks).inspect_err(|err| {
            warn!(error = %err, "saving tasks failed; change rolled back");
        })
    }
}
