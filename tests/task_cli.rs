mod support;

use std::fs;

use predicates::str::contains;
use serde_json::Value;
use taskpad::lock::{lock_path_for, FileLock};

use support::TestData;

#[test]
fn add_then_list_shows_task() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();

    data.cmd()
        .args(["add", "buy", "milk"])
        .assert()
        .success()
        .stdout(contains("Task added"))
        .stdout(contains("Text: buy milk"));

    data.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("[ ]"))
        .stdout(contains("buy milk"))
        .stdout(contains("All: 1"));

    let stored: Value = serde_json::from_str(&fs::read_to_string(data.tasks_file("tasks"))?)?;
    assert_eq!(stored[0]["text"], "buy milk");
    assert_eq!(stored[0]["completed"], false);
    assert!(stored[0]["createdAt"].is_string());

    Ok(())
}

#[test]
fn blank_add_is_rejected_without_writing() {
    let data = TestData::new();

    data.cmd()
        .args(["add", "   "])
        .assert()
        .code(2)
        .stderr(contains("task text cannot be empty"));

    assert!(!data.tasks_file("tasks").exists());
}

#[test]
fn buy_milk_scenario() {
    let data = TestData::new();

    let id = data.add("buy milk");
    let counts = data.json(&["count"]);
    assert_eq!(counts["data"]["total"], 1);
    assert_eq!(counts["data"]["active"], 1);
    assert_eq!(counts["data"]["completed"], 0);

    let toggled = data.json(&["toggle", &id.to_string()]);
    assert_eq!(toggled["data"]["task"]["completed"], true);
    assert_eq!(toggled["data"]["counts"]["active"], 0);
    assert_eq!(toggled["data"]["counts"]["completed"], 1);

    data.cmd().args(["add", ""]).assert().code(2);
    assert_eq!(data.json(&["count"])["data"]["total"], 1);

    let removed = data.json(&["rm", &id.to_string(), "--yes"]);
    assert_eq!(removed["data"]["removed"], true);
    assert_eq!(data.json(&["count"])["data"]["total"], 0);
}

#[test]
fn list_filters_and_empty_messages() {
    let data = TestData::new();

    data.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No tasks yet. Add one above!"));

    let done = data.add("done thing");
    data.add("open thing");
    data.json(&["toggle", &done.to_string()]);

    let active = data.json(&["list", "--filter", "active"]);
    assert_eq!(active["data"]["filter"], "active");
    let tasks = active["data"]["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["text"], "open thing");

    let completed = data.json(&["list", "-f", "completed"]);
    let tasks = completed["data"]["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["text"], "done thing");

    let all = data.json(&["list"]);
    let texts: Vec<_> = all["data"]["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .map(|task| task["text"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(texts, ["done thing", "open thing"]);

    data.json(&["clear-completed", "--yes"]);
    data.cmd()
        .args(["list", "--filter", "completed"])
        .assert()
        .success()
        .stdout(contains("No completed tasks yet."));
}

#[test]
fn invalid_filter_is_user_error() {
    let data = TestData::new();
    data.cmd()
        .args(["list", "--filter", "done"])
        .assert()
        .code(2)
        .stderr(contains("invalid filter 'done'"));
}

#[test]
fn edit_replaces_text_and_rejects_blank() {
    let data = TestData::new();
    let id = data.add("draft");

    let edited = data.json(&["edit", &id.to_string(), "  final", "version "]);
    assert_eq!(edited["data"]["task"]["text"], "final version");
    assert_eq!(edited["data"]["task"]["id"], id);

    data.cmd()
        .args(["edit", &id.to_string(), " "])
        .assert()
        .code(2)
        .stderr(contains("task text cannot be empty"));

    let list = data.json(&["list"]);
    assert_eq!(list["data"]["tasks"][0]["text"], "final version");
}

#[test]
fn unknown_id_is_not_found() {
    let data = TestData::new();
    data.add("only");

    for args in [
        vec!["toggle", "12345"],
        vec!["edit", "12345", "x"],
        vec!["rm", "12345", "--yes"],
    ] {
        data.cmd()
            .args(&args)
            .assert()
            .code(2)
            .stderr(contains("Task not found: 12345"))
            .stderr(contains("hint: taskpad list"));
    }
}

#[test]
fn rm_asks_for_confirmation() {
    let data = TestData::new();
    let id = data.add("keep me");

    data.cmd()
        .args(["rm", &id.to_string()])
        .write_stdin("n\n")
        .assert()
        .success()
        .stderr(contains("Are you sure you want to delete this task?"))
        .stdout(contains("Nothing removed"));
    assert_eq!(data.json(&["count"])["data"]["total"], 1);

    data.cmd()
        .args(["rm", &id.to_string()])
        .write_stdin("")
        .assert()
        .success();
    assert_eq!(data.json(&["count"])["data"]["total"], 1);

    data.cmd()
        .args(["rm", &id.to_string()])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(contains("Task removed"));
    assert_eq!(data.json(&["count"])["data"]["total"], 0);
}

#[test]
fn clear_completed_confirms_and_reports() {
    let data = TestData::new();
    let a = data.add("a");
    data.add("b");
    data.json(&["toggle", &a.to_string()]);

    data.cmd()
        .arg("clear-completed")
        .write_stdin("no\n")
        .assert()
        .success()
        .stderr(contains("Are you sure you want to clear all completed tasks?"))
        .stdout(contains("Removed: 0"));
    assert_eq!(data.json(&["count"])["data"]["completed"], 1);

    let cleared = data.json(&["clear-completed", "--yes"]);
    assert_eq!(cleared["data"]["removed"], 1);
    assert_eq!(cleared["data"]["counts"]["total"], 1);

    let again = data.json(&["clear-completed"]);
    assert_eq!(again["data"]["removed"], 0);
    assert_eq!(again["data"]["counts"]["total"], 1);
}

#[test]
fn ids_are_strictly_increasing() {
    let data = TestData::new();
    let ids: Vec<u64> = (0..5).map(|i| data.add(&format!("task {i}"))).collect();
    for pair in ids.windows(2) {
        assert!(pair[0] < pair[1], "ids not increasing: {ids:?}");
    }
}

#[test]
fn malformed_store_lists_empty() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();
    data.write_file("tasks.json", "{ definitely not a task list")?;

    data.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No tasks yet. Add one above!"));

    data.add("fresh start");
    let stored: Value = serde_json::from_str(&fs::read_to_string(data.tasks_file("tasks"))?)?;
    assert_eq!(stored.as_array().map(Vec::len), Some(1));

    Ok(())
}

#[test]
fn unwritable_store_reports_operation_failure() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();
    let not_a_dir = data.write_file("blocker", "plain file")?;

    support::taskpad_cmd()
        .env("TASKPAD_DIR", &not_a_dir)
        .args(["add", "x"])
        .assert()
        .code(4)
        .stderr(contains("Persistence error"));

    Ok(())
}

#[test]
fn locked_store_fails_without_touching_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();
    data.write_config("[storage]\nlock_timeout_ms = 100\n")?;
    data.add("first");
    data.add("second");
    let before = fs::read_to_string(data.tasks_file("tasks"))?;

    let held = FileLock::acquire(lock_path_for(&data.tasks_file("tasks")), 1000)?;
    data.cmd()
        .args(["add", "third"])
        .assert()
        .code(4)
        .stderr(contains("Lock acquisition failed"));
    drop(held);

    assert_eq!(fs::read_to_string(data.tasks_file("tasks"))?, before);
    let value = data.json(&["count"]);
    assert_eq!(value["data"]["total"], 2);

    Ok(())
}

#[test]
fn json_error_envelope() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();

    let output = data.cmd().args(["--json", "toggle", "99"]).output()?;
    assert_eq!(output.status.code(), Some(2));

    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["schema_version"], "taskpad.v1");
    assert_eq!(value["command"], "toggle");
    assert_eq!(value["status"], "error");
    assert_eq!(value["error"]["kind"], "user_error");
    assert_eq!(value["error"]["code"], 2);
    assert_eq!(value["error"]["details"]["id"], 99);

    Ok(())
}

#[test]
fn storage_key_from_config_and_flag() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();
    data.write_config("[storage]\nkey = \"work\"\n")?;

    data.add("from config");
    assert!(data.tasks_file("work").exists());
    assert!(!data.tasks_file("tasks").exists());

    data.cmd()
        .args(["--key", "home", "add", "from flag"])
        .assert()
        .success();
    assert!(data.tasks_file("home").exists());

    data.cmd()
        .args(["--key", "../escape", "list"])
        .assert()
        .code(2)
        .stderr(contains("invalid storage key"));

    Ok(())
}

#[test]
fn quiet_suppresses_human_output() {
    let data = TestData::new();
    data.cmd()
        .args(["--quiet", "add", "silent"])
        .assert()
        .success()
        .stdout("");
    assert_eq!(data.json(&["count"])["data"]["total"], 1);
}
