//! Task records and the read-only views over them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Task identifier: milliseconds since the Unix epoch at creation, bumped to
/// stay strictly increasing within a store.
pub type TaskId = u64;

/// A single to-do record.
///
/// Serialized in the same shape the task list has always been stored in:
/// `{"id", "text", "completed", "createdAt"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: TaskId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at,
        }
    }
}

/// Which subset of the list to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    All,
    Active,
    Completed,
}

impl View {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            View::All => true,
            View::Active => !task.completed,
            View::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            View::All => "all",
            View::Active => "active",
            View::Completed => "completed",
        }
    }

    /// Message shown when the view has nothing in it
    pub fn empty_message(self) -> &'static str {
        match self {
            View::All => "No tasks yet. Add one above!",
            View::Active => "No active tasks.",
            View::Completed => "No completed tasks yet.",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(View::All),
            "active" => Ok(View::Active),
            "completed" => Ok(View::Completed),
            _ => Err(Error::InvalidArgument(format!(
                "invalid filter '{}': must be all, active, or completed",
                s
            ))),
        }
    }
}

/// Per-state task counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub active: usize,
    pub completed: usize,
    pub total: usize,
}

impl Counts {
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            active: tasks.len() - completed,
            completed,
            total: tasks.len(),
        }
    }
}

/// Hands out task ids.
///
/// Ids start from the wall clock in milliseconds but never repeat or go
/// backwards: two tasks created within the same millisecond, or after the
/// clock steps back, still get distinct increasing ids.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: TaskId,
}

impl IdGenerator {
    /// Generator that will only issue ids above every id in `tasks`.
    pub fn seeded(tasks: &[Task]) -> Self {
        Self {
            last: tasks.iter().map(|task| task.id).max().unwrap_or(0),
        }
    }

    /// Largest id issued or seen so far
    pub fn last(&self) -> TaskId {
        self.last
    }

    /// Id for a task created at `now`. Does not advance the generator.
    ///
    /// `None` once `last` is `TaskId::MAX` and no larger id exists.
    pub fn peek_at(&self, now: DateTime<Utc>) -> Option<TaskId> {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        self.last.checked_add(1).map(|next| millis.max(next))
    }

    /// Record `id` as issued.
    pub fn advance_to(&mut self, id: TaskId) {
        self.last = self.last.max(id);
    }
}
