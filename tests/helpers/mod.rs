#![allow(dead_code)]

use async_trait::async_trait;
use gitstate::{CommandRunner, GitError, GitResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;
use tempfile::TempDir;

/// Helper to create a test git repository on branch `main`
pub fn create_test_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().to_path_buf();
    init_repo_at(&repo_path);
    (temp_dir, repo_path)
}

pub fn init_repo_at(repo_path: &Path) {
    fs::create_dir_all(repo_path).unwrap();
    git(repo_path, &["init"]);
    git(repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(repo_path, &["config", "user.name", "Test User"]);
    git(repo_path, &["config", "user.email", "test@example.com"]);
    git(repo_path, &["config", "commit.gpgsign", "false"]);
}

/// Run git and fail the test if it fails
pub fn git(repo_path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Helper to create a commit
pub fn create_commit(repo_path: &Path, file: &str, content: &str, message: &str) {
    fs::write(repo_path.join(file), content).expect("Failed to write file");
    git(repo_path, &["add", file]);
    git(repo_path, &["commit", "-m", message]);
}

/// Runner answering from a table keyed by the exact argument string.
/// Unknown commands fail like a git error.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, Result<String, String>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner that answers every refresh command of a healthy repository
    pub fn healthy() -> Self {
        let runner = Self::new();
        runner.ok(PROBE, "true");
        runner.ok(USER_NAME, "Jane Doe");
        runner.ok(USER_EMAIL, "jane@example.com");
        runner.ok(STATUS, " M src/lib.rs");
        runner.ok(BRANCHES, "  main\n* feature/x\n  old");
        runner.ok(LOG, "a1b2c3d|Jane Doe|2024-01-15|Fix bug\n9f8e7d6|Jane Doe|2024-01-14|Start");
        runner.ok(STASH_LIST, "stash@{0}: WIP on main: abc def\nstash@{1}: On dev: ghi");
        runner
    }

    pub fn ok(&self, args: &str, output: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(args.to_string(), Ok(output.to_string()));
    }

    pub fn fail(&self, args: &str, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(args.to_string(), Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, args: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == args).count()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, args: &str, _working_dir: &Path) -> GitResult<String> {
        self.calls.lock().unwrap().push(args.to_string());
        let response = self.responses.lock().unwrap().get(args).cloned();
        match response {
            Some(Ok(out)) => Ok(out),
            Some(Err(message)) => Err(GitError::Execution {
                command: args.to_string(),
                message,
            }),
            None => Err(GitError::Execution {
                command: args.to_string(),
                message: format!("unscripted command: {}", args),
            }),
        }
    }
}

pub const PROBE: &str = "rev-parse --is-inside-work-tree";
pub const USER_NAME: &str = "config --global user.name";
pub const USER_EMAIL: &str = "config --global user.email";
pub const STATUS: &str = "status --short";
pub const BRANCHES: &str = "branch";
pub const LOG: &str = r#"log --pretty=format:"%h|%an|%ad|%s" --date=short"#;
pub const STASH_LIST: &str = "stash list";

/// Directory that the locator accepts as a root without a real repository
pub fn fake_root() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join(".git")).unwrap();
    temp_dir
}
