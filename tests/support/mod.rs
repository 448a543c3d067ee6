use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Temporary taskpad data directory
pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn tasks_file(&self, key: &str) -> PathBuf {
        self.dir.path().join(format!("{key}.json"))
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file("taskpad.toml", contents)
    }

    /// `taskpad` pointed at this data directory
    pub fn cmd(&self) -> Command {
        let mut cmd = taskpad_cmd();
        cmd.env("TASKPAD_DIR", self.dir.path());
        cmd
    }

    /// Run `taskpad --json <args>` and return the parsed envelope.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run taskpad");
        assert!(
            output.status.success(),
            "taskpad {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("json output")
    }

    /// Add a task and return its id.
    pub fn add(&self, text: &str) -> u64 {
        let value = self.json(&["add", text]);
        value["data"]["task"]["id"].as_u64().expect("task id")
    }
}

pub fn taskpad_cmd() -> Command {
    let mut cmd = Command::cargo_bin("taskpad").expect("binary");
    cmd.env_remove("RUST_LOG").env_remove("TASKPAD_KEY");
    cmd
}
