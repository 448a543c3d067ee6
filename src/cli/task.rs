//! taskpad command implementations.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::FileBackend;
use crate::store::TaskStore;
use crate::task::{Counts, Task, TaskId, View};

const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";
const CLEAR_PROMPT: &str = "Are you sure you want to clear all completed tasks?";

pub struct CommonOptions {
    pub dir: Option<PathBuf>,
    pub key: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

impl CommonOptions {
    fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

pub struct AddOptions {
    pub text: Vec<String>,
    pub common: CommonOptions,
}

pub struct ListOptions {
    pub filter: String,
    pub common: CommonOptions,
}

pub struct ToggleOptions {
    pub id: TaskId,
    pub common: CommonOptions,
}

pub struct EditOptions {
    pub id: TaskId,
    pub text: Vec<String>,
    pub common: CommonOptions,
}

pub struct RmOptions {
    pub id: TaskId,
    pub yes: bool,
    pub common: CommonOptions,
}

pub struct ClearCompletedOptions {
    pub yes: bool,
    pub common: CommonOptions,
}

#[derive(Serialize)]
struct TaskOutput {
    task: Task,
    counts: Counts,
}

#[derive(Serialize)]
struct TaskListOutput<'a> {
    filter: View,
    counts: Counts,
    tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
struct RemovedOutput {
    id: TaskId,
    removed: bool,
    counts: Counts,
}

#[derive(Serialize)]
struct ClearedOutput {
    removed: usize,
    counts: Counts,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let mut store = open_store(&options.common)?;
    let text = options.text.join(" ");

    let task = store
        .add(&text)?
        .ok_or_else(|| Error::InvalidArgument("task text cannot be empty".to_string()))?;

    let mut human = HumanOutput::new("Task added");
    human.push_summary("ID", task.id.to_string());
    human.push_summary("Text", task.text.clone());

    emit_success(
        options.common.output(),
        "add",
        &TaskOutput {
            task,
            counts: store.counts(),
        },
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let view: View = options.filter.parse()?;
    let store = open_store(&options.common)?;
    let counts = store.counts();
    let tasks = store.filtered(view);

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Filter", view.as_str());
    human.push_summary("All", counts.total.to_string());
    human.push_summary("Active", counts.active.to_string());
    human.push_summary("Completed", counts.completed.to_string());
    if tasks.is_empty() {
        human.push_detail(view.empty_message());
    }
    for task in &tasks {
        human.push_detail(format_task_line(task));
    }

    emit_success(
        options.common.output(),
        "list",
        &TaskListOutput {
            filter: view,
            counts,
            tasks,
        },
        Some(&human),
    )
}

pub fn run_toggle(options: ToggleOptions) -> Result<()> {
    let mut store = open_store(&options.common)?;
    if !store.toggle(options.id)?.is_applied() {
        return Err(Error::TaskNotFound(options.id));
    }
    let task = current_task(&store, options.id)?;

    let header = if task.completed {
        "Task completed"
    } else {
        "Task reopened"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("ID", task.id.to_string());
    human.push_summary("Text", task.text.clone());

    emit_success(
        options.common.output(),
        "toggle",
        &TaskOutput {
            task,
            counts: store.counts(),
        },
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let mut store = open_store(&options.common)?;
    if !store.contains(options.id) {
        return Err(Error::TaskNotFound(options.id));
    }
    let text = options.text.join(" ");
    if !store.edit(options.id, &text)?.is_applied() {
        return Err(Error::InvalidArgument("task text cannot be empty".to_string()));
    }
    let task = current_task(&store, options.id)?;

    let mut human = HumanOutput::new("Task updated");
    human.push_summary("ID", task.id.to_string());
    human.push_summary("Text", task.text.clone());

    emit_success(
        options.common.output(),
        "edit",
        &TaskOutput {
            task,
            counts: store.counts(),
        },
        Some(&human),
    )
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let mut store = open_store(&options.common)?;
    if !store.contains(options.id) {
        return Err(Error::TaskNotFound(options.id));
    }

    let removed = if confirm(DELETE_PROMPT, options.yes)? {
        store.remove(options.id)?.is_applied()
    } else {
        false
    };

    let header = if removed {
        "Task removed"
    } else {
        "Nothing removed"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("ID", options.id.to_string());
    if !removed {
        human.push_warning("deletion cancelled");
    }

    emit_success(
        options.common.output(),
        "rm",
        &RemovedOutput {
            id: options.id,
            removed,
            counts: store.counts(),
        },
        Some(&human),
    )
}

pub fn run_clear_completed(options: ClearCompletedOptions) -> Result<()> {
    let mut store = open_store(&options.common)?;

    let mut human = HumanOutput::new("Completed tasks cleared");
    let removed = if store.counts().completed == 0 {
        human.push_warning("no completed tasks");
        0
    } else if confirm(CLEAR_PROMPT, options.yes)? {
        store.clear_completed()?
    } else {
        human.push_warning("clear cancelled");
        0
    };

    human.push_summary("Removed", removed.to_string());
    human.push_summary("Remaining", store.counts().total.to_string());

    emit_success(
        options.common.output(),
        "clear-completed",
        &ClearedOutput {
            removed,
            counts: store.counts(),
        },
        Some(&human),
    )
}

pub fn run_count(common: CommonOptions) -> Result<()> {
    let store = open_store(&common)?;
    let counts = store.counts();

    let mut human = HumanOutput::new("Task counts");
    human.push_summary("Active", counts.active.to_string());
    human.push_summary("Completed", counts.completed.to_string());
    human.push_summary("Total", counts.total.to_string());

    emit_success(common.output(), "count", &counts, Some(&human))
}

fn open_store(common: &CommonOptions) -> Result<TaskStore<FileBackend>> {
    let data_dir = config::resolve_data_dir(common.dir.as_deref());
    let config = Config::load_from_dir(&data_dir);
    let key = common
        .key
        .clone()
        .unwrap_or_else(|| config.storage.key.clone());
    config::validate_key(&key)
        .map_err(|_| Error::InvalidArgument(format!("invalid storage key '{key}'")))?;

    tracing::debug!(dir = %data_dir.display(), key = %key, "opening task store");
    let backend = FileBackend::new(data_dir).with_lock_timeout(config.storage.lock_timeout_ms);
    TaskStore::open_with_key(backend, key)
}

fn current_task(store: &TaskStore<FileBackend>, id: TaskId) -> Result<Task> {
    store.get(id).cloned().ok_or(Error::TaskNotFound(id))
}

fn format_task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!(
        "[{mark}] {} {} ({})",
        task.id,
        task.text,
        task.created_at.format("%Y-%m-%d")
    )
}

/// Ask on stderr and read a y/N answer from stdin. EOF counts as no.
fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    eprint!("{prompt} [y/N] ");
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
