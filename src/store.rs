//! The task list and its write-through persistence.
//!
//! Every mutation builds the next list, writes it to the backend, and only
//! then replaces the in-memory list. A failed write leaves the store exactly
//! as it was. Empty input is not an error: the call is a no-op and reports
//! [`Commit::Unchanged`].
//!
//! Opening tolerates bad data but not bad storage. A missing or undecodable
//! document opens as an empty list, and stored records that break the list's
//! invariants are repaired one by one. A backend that cannot be read at all
//! fails the open.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::storage::Backend;
use crate::task::{Counts, IdGenerator, Task, TaskId, View};

/// Storage key used when none is configured
pub const DEFAULT_KEY: &str = "tasks";

/// Outcome of a mutating operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The list changed and was persisted.
    Applied,
    /// Nothing to do; nothing was written.
    Unchanged,
}

impl Commit {
    pub fn is_applied(self) -> bool {
        self == Commit::Applied
    }
}

/// Ordered task list backed by a key-value store
#[derive(Debug)]
pub struct TaskStore<B: Backend> {
    backend: B,
    key: String,
    tasks: Vec<Task>,
    ids: IdGenerator,
}

impl<B: Backend> TaskStore<B> {
    /// Open the store under [`DEFAULT_KEY`].
    pub fn open(backend: B) -> Result<Self> {
        Self::open_with_key(backend, DEFAULT_KEY)
    }

    /// Open the store under `key`.
    ///
    /// Missing or malformed state opens as an empty list. Backend read
    /// failures (lock timeout, I/O) are returned.
    pub fn open_with_key(backend: B, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let tasks = load_tasks(&backend, &key)?;
        let ids = IdGenerator::seeded(&tasks);
        tracing::debug!(key = %key, tasks = tasks.len(), "task store opened");
        Ok(Self {
            backend,
            key,
            tasks,
            ids,
        })
    }

    /// Current snapshot, in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Append a new task.
    ///
    /// Returns `None` without writing when `raw_text` is blank.
    pub fn add(&mut self, raw_text: &str) -> Result<Option<Task>> {
        self.add_at(raw_text, Utc::now())
    }

    /// [`add`](Self::add) with an explicit creation time.
    pub fn add_at(&mut self, raw_text: &str, now: DateTime<Utc>) -> Result<Option<Task>> {
        let text = raw_text.trim();
        if text.is_empty() {
            tracing::debug!("add ignored: empty text");
            return Ok(None);
        }

        let id = self
            .ids
            .peek_at(now)
            .ok_or(Error::IdsExhausted(self.ids.last()))?;
        let task = Task::new(id, text, now);
        let mut next = self.tasks.clone();
        next.push(task.clone());

        self.commit(next)?;
        self.ids.advance_to(id);
        tracing::debug!(id, "task added");
        Ok(Some(task))
    }

    /// Flip the completed flag of task `id`.
    pub fn toggle(&mut self, id: TaskId) -> Result<Commit> {
        if !self.contains(id) {
            return Ok(Commit::Unchanged);
        }

        let next = self
            .tasks
            .iter()
            .map(|task| {
                if task.id == id {
                    Task {
                        completed: !task.completed,
                        ..task.clone()
                    }
                } else {
                    task.clone()
                }
            })
            .collect();

        self.commit(next)?;
        tracing::debug!(id, "task toggled");
        Ok(Commit::Applied)
    }

    /// Replace the text of task `id`.
    ///
    /// Blank text is rejected the same way [`add`](Self::add) rejects it.
    pub fn edit(&mut self, id: TaskId, raw_text: &str) -> Result<Commit> {
        let text = raw_text.trim();
        if text.is_empty() {
            tracing::debug!(id, "edit ignored: empty text");
            return Ok(Commit::Unchanged);
        }
        if !self.contains(id) {
            return Ok(Commit::Unchanged);
        }

        let next = self
            .tasks
            .iter()
            .map(|task| {
                if task.id == id {
                    Task {
                        text: text.to_string(),
                        ..task.clone()
                    }
                } else {
                    task.clone()
                }
            })
            .collect();

        self.commit(next)?;
        tracing::debug!(id, "task edited");
        Ok(Commit::Applied)
    }

    /// Drop task `id`. Confirmation is the caller's business.
    pub fn remove(&mut self, id: TaskId) -> Result<Commit> {
        if !self.contains(id) {
            return Ok(Commit::Unchanged);
        }

        let next = self
            .tasks
            .iter()
            .filter(|task| task.id != id)
            .cloned()
            .collect();

        self.commit(next)?;
        tracing::debug!(id, "task removed");
        Ok(Commit::Applied)
    }

    /// Drop every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> Result<usize> {
        let next: Vec<Task> = self
            .tasks
            .iter()
            .filter(|task| !task.completed)
            .cloned()
            .collect();
        let removed = self.tasks.len() - next.len();
        if removed == 0 {
            return Ok(0);
        }

        self.commit(next)?;
        tracing::debug!(removed, "completed tasks cleared");
        Ok(removed)
    }

    /// Tasks visible under `view`, in list order
    pub fn filtered(&self, view: View) -> Vec<&Task> {
        self.tasks.iter().filter(|task| view.matches(task)).collect()
    }

    pub fn counts(&self) -> Counts {
        Counts::of(&self.tasks)
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<()> {
        let document = serde_json::to_string(&next)
            .map_err(|err| Error::Persistence(format!("failed to encode tasks: {err}")))?;
        if let Err(err) = self.backend.save(&self.key, &document) {
            tracing::warn!(key = %self.key, error = %err, "task list not saved");
            return Err(err);
        }
        self.tasks = next;
        Ok(())
    }
}

fn load_tasks<B: Backend>(backend: &B, key: &str) -> Result<Vec<Task>> {
    let Some(document) = backend.load(key)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Vec<Task>>(&document) {
        Ok(tasks) => Ok(repair_loaded(tasks, key)),
        Err(err) => {
            tracing::warn!(key, error = %err, "stored tasks malformed, starting empty");
            Ok(Vec::new())
        }
    }
}

/// Drop records with blank text and give repeated ids fresh ones above the
/// largest stored id. The first record keeps a shared id; order is kept.
fn repair_loaded(mut tasks: Vec<Task>, key: &str) -> Vec<Task> {
    let before = tasks.len();
    tasks.retain(|task| !task.text.trim().is_empty());
    if tasks.len() < before {
        tracing::warn!(
            key,
            dropped = before - tasks.len(),
            "dropped stored tasks with empty text"
        );
    }

    let mut last = tasks.iter().map(|task| task.id).max().unwrap_or(0);
    let mut seen = HashSet::with_capacity(tasks.len());
    tasks.retain_mut(|task| {
        if seen.insert(task.id) {
            return true;
        }
        match last.checked_add(1) {
            Some(id) => {
                tracing::warn!(
                    key,
                    old = task.id,
                    new = id,
                    "renumbered stored task with duplicate id"
                );
                task.id = id;
                last = id;
                seen.insert(id);
                true
            }
            None => {
                tracing::warn!(
                    key,
                    id = task.id,
                    "dropped stored task with duplicate id: no ids left"
                );
                false
            }
        }
    });

    tasks
}
