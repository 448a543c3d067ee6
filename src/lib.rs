//! taskpad - local task manager library
//!
//! The core is [`store::TaskStore`]: an ordered list of tasks kept in sync
//! with a key-value [`storage::Backend`]. Every mutation is written through
//! before it becomes visible, and a failed write leaves the list unchanged.
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `taskpad.toml`
//! - `error`: Error types and result aliases
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON output for CLI commands
//! - `storage`: Key-value persistence backends
//! - `store`: The task list and its operations
//! - `task`: Task records, views and id generation

pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod output;
pub mod storage;
pub mod store;
pub mod task;

pub use error::{Error, Result};
pub use store::{Commit, TaskStore};
pub use task::{Counts, Task, TaskId, View};
