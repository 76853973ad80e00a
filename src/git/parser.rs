use crate::error::{GitError, GitResult};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static STASH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^stash@\{(\d+)\}:\s(.+)$").expect("stash pattern is valid")
});

/// Parse plain `git branch` output
///
/// A leading `*` marks the current branch and is stripped from the name.
/// A leading `+` (checked out in another worktree) is stripped too.
/// All entries are local.
pub fn parse_branch_list(output: &str) -> Vec<BranchEntry> {
    let mut branches: Vec<BranchEntry> = Vec::new();

    for line in output.lines() {
        // Format: "* main", "+ feature-x" or "  old"
        let is_current = line.trim_start().starts_with('*');
        let name = line.trim().trim_start_matches(['*', '+']).trim();
        if name.is_empty() {
            continue;
        }

        if branches.iter().any(|b| b.name == name) {
            continue;
        }

        branches.push(BranchEntry {
            name: name.to_string(),
            is_remote: false,
            is_current,
        });
    }

    branches
}

/// Parse `git branch [-r] --format=%(refname:short)` output
///
/// `is_current` is derived from `current` and only ever set on local names.
pub fn parse_branch_names(
    output: &str,
    is_remote: bool,
    current: Option<&str>,
) -> Vec<BranchEntry> {
    let mut branches: Vec<BranchEntry> = Vec::new();

    for name in output.lines().map(|l| l.trim().trim_matches('"')) {
        if name.is_empty() || branches.iter().any(|b| b.name == name) {
            continue;
        }
        branches.push(BranchEntry {
            name: name.to_string(),
            is_remote,
            is_current: !is_remote && current == Some(name),
        });
    }

    branches
}

/// Parse `git log --pretty=format:"%h|%an|%ad|%s" --date=short` output
///
/// Residual quote characters are stripped. A message containing `|` splits
/// into extra fields; only the first four are kept.
pub fn parse_log(output: &str) -> GitResult<Vec<CommitEntry>> {
    let mut commits = Vec::new();

    for line in output.lines() {
        let line = line.replace('"', "");
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() < 4 {
            return Err(GitError::ParseError(format!(
                "Expected hash|author|date|message, got: {}",
                line
            )));
        }

        commits.push(CommitEntry {
            hash: parts[0].trim().to_string(),
            author: parts[1].to_string(),
            date: parts[2].to_string(),
            message: parts[3].to_string(),
        });
    }

    Ok(commits)
}

/// Parse `git stash list` output
///
/// Lines that do not look like `stash@{N}: message` are dropped.
pub fn parse_stash_list(output: &str) -> Vec<StashEntry> {
    output
        .lines()
        .filter_map(|line| STASH_LINE.captures(line.trim_end()))
        .map(|caps| StashEntry {
            index: format!("stash@{{{}}}", &caps[1]),
            message: caps[2].to_string(),
        })
        .collect()
}

/// Parse one-path-per-line output such as `git ls-files`
pub fn parse_path_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Represents a branch from git branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchEntry {
    pub name: String,
    pub is_remote: bool,
    pub is_current: bool,
}

/// Represents a commit from git log
///
/// `hash` is abbreviated and only identifies the commit within the history
/// it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEntry {
    pub hash: String,
    pub author: String,
    pub date: String,
    pub message: String,
}

impl CommitEntry {
    /// The `YYYY-MM-DD` date, if well-formed
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Represents a stash entry
///
/// `index` is positional and shifts when an entry is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashEntry {
    pub index: String,
    pub message: String,
}
