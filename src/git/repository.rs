use crate::config::HistoryConfig;
use crate::error::GitResult;
use crate::git::executor::{CommandRunner, quote};
use crate::git::parser::{self, BranchEntry, CommitEntry, StashEntry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fixed log format consumed by [`parser::parse_log`]
pub const LOG_FORMAT: &str = r#"--pretty=format:"%h|%an|%ad|%s" --date=short"#;

pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_BRANCH: &str = "main";

/// Global user identity from git configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub name: String,
    pub email: String,
}

/// Command layer bound to one repository root.
///
/// Every method runs one or more git commands and returns their result.
/// Nothing here caches; mutating commands leave any cached state untouched.
#[derive(Clone)]
pub struct Repository {
    path: PathBuf,
    runner: Arc<dyn CommandRunner>,
    history: HistoryConfig,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.path)
            .field("history", &self.history)
            .finish()
    }
}

impl Repository {
    /// Create a Repository for a known root
    pub fn new<P: AsRef<Path>>(path: P, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            runner,
            history: HistoryConfig::default(),
        }
    }

    pub fn with_history(mut self, history: HistoryConfig) -> Self {
        self.history = history;
        self
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn git(&self, args: &str) -> GitResult<String> {
        self.runner.run(args, &self.path).await
    }

    /// Initialize a new repository in `dir`
    pub async fn init(runner: &dyn CommandRunner, dir: &Path) -> GitResult<String> {
        runner.run("init", dir).await
    }

    /// Clone `url` into a new directory under `parent`
    pub async fn clone_into(runner: &dyn CommandRunner, parent: &Path, url: &str) -> GitResult<String> {
        runner.run(&format!("clone {}", quote(url)), parent).await
    }

    /// Whether the root is inside a work tree according to git
    pub async fn is_valid(&self) -> bool {
        match self.git("rev-parse --is-inside-work-tree").await {
            Ok(out) => out == "true",
            Err(e) => {
                log::debug!("{} is not a work tree: {}", self.path.display(), e);
                false
            }
        }
    }

    // Identity

    pub async fn user_name(&self) -> GitResult<String> {
        self.git("config --global user.name").await
    }

    pub async fn user_email(&self) -> GitResult<String> {
        self.git("config --global user.email").await
    }

    pub async fn user_identity(&self) -> GitResult<UserIdentity> {
        let name = self.user_name().await?;
        let email = self.user_email().await?;
        Ok(UserIdentity { name, email })
    }

    pub async fn set_user_name(&self, name: &str) -> GitResult<String> {
        self.git(&format!("config --global user.name {}", quote(name))).await
    }

    pub async fn set_user_email(&self, email: &str) -> GitResult<String> {
        self.git(&format!("config --global user.email {}", quote(email))).await
    }

    // Working tree

    /// Short-form status, as a display blob
    pub async fn status(&self) -> GitResult<String> {
        self.git("status --short").await
    }

    /// Stage `path`, or everything when `None`
    pub async fn add(&self, path: Option<&str>) -> GitResult<String> {
        self.git(&format!("add -- {}", quote(path.unwrap_or(".")))).await
    }

    pub async fn commit(&self, message: &str) -> GitResult<String> {
        self.git(&format!("commit -m {}", quote(message))).await
    }

    /// Unstage a file without touching the working copy
    pub async fn reset_file(&self, path: &str) -> GitResult<String> {
        self.git(&format!("reset -- {}", quote(path))).await
    }

    pub async fn remove_file(&self, path: &str) -> GitResult<String> {
        self.git(&format!("rm -- {}", quote(path))).await
    }

    /// Stop tracking a file but keep it on disk
    pub async fn remove_from_index(&self, path: &str) -> GitResult<String> {
        self.git(&format!("rm --cached -- {}", quote(path))).await
    }

    pub async fn move_file(&self, old_path: &str, new_path: &str) -> GitResult<String> {
        self.git(&format!("mv -- {} {}", quote(old_path), quote(new_path))).await
    }

    pub async fn unstaged_diff(&self) -> GitResult<String> {
        self.git("diff").await
    }

    pub async fn staged_diff(&self) -> GitResult<String> {
        self.git("diff --staged").await
    }

    pub async fn untracked_ignored_files(&self) -> GitResult<Vec<String>> {
        let out = self.git("ls-files --other --ignored --exclude-standard").await?;
        Ok(parser::parse_path_list(&out))
    }

    // Branches

    /// Local branches from plain `git branch`
    pub async fn branches(&self) -> GitResult<Vec<BranchEntry>> {
        let out = self.git("branch").await?;
        Ok(parser::parse_branch_list(&out))
    }

    pub async fn current_branch(&self) -> GitResult<String> {
        self.git("rev-parse --abbrev-ref HEAD").await
    }

    /// Local then remote branches. The current branch is matched against
    /// local names only; an unresolvable HEAD leaves none marked.
    pub async fn all_branches(&self) -> GitResult<Vec<BranchEntry>> {
        let local = self.git("branch --format=%(refname:short)").await?;
        let remote = self.git("branch -r --format=%(refname:short)").await?;
        let current = self.current_branch().await.ok();

        let mut branches = parser::parse_branch_names(&local, false, current.as_deref());
        branches.extend(parser::parse_branch_names(&remote, true, None));
        Ok(branches)
    }

    pub async fn create_branch(&self, name: &str) -> GitResult<String> {
        self.git(&format!("branch {}", quote(name))).await
    }

    pub async fn switch_branch(&self, name: &str) -> GitResult<String> {
        self.git(&format!("checkout {}", quote(name))).await
    }

    pub async fn merge_branch(&self, name: &str) -> GitResult<String> {
        self.git(&format!("merge {}", quote(name))).await
    }

    pub async fn merge_remote_branch(&self, remote: &str, name: &str) -> GitResult<String> {
        self.git(&format!("merge {}", quote(&format!("{remote}/{name}")))).await
    }

    pub async fn delete_branch(&self, name: &str) -> GitResult<String> {
        self.git(&format!("branch -d {}", quote(name))).await
    }

    // History

    /// History of the checked-out branch, newest first
    pub async fn log(&self) -> GitResult<Vec<CommitEntry>> {
        let limit = match self.history.max_commits {
            Some(n) => format!(" -n {n}"),
            None => String::new(),
        };
        let out = self.git(&format!("log {LOG_FORMAT}{limit}")).await?;
        parser::parse_log(&out)
    }

    /// History of one file, following renames
    pub async fn file_history(&self, path: &str) -> GitResult<Vec<CommitEntry>> {
        let out = self
            .git(&format!("log --follow {LOG_FORMAT} -- {}", quote(path)))
            .await?;
        parser::parse_log(&out)
    }

    pub async fn branch_commits(&self, branch: &str) -> GitResult<Vec<CommitEntry>> {
        let out = self.git(&format!("log {} {LOG_FORMAT}", quote(branch))).await?;
        parser::parse_log(&out)
    }

    /// Changes on `right` since it diverged from `left`
    pub async fn diff_branches(&self, left: &str, right: &str) -> GitResult<String> {
        self.git(&format!("diff {}", quote(&format!("{left}...{right}")))).await
    }

    pub async fn show_commit(&self, hash: &str) -> GitResult<String> {
        self.git(&format!("show {}", quote(hash))).await
    }

    pub async fn reset(&self, hash: &str, hard: bool) -> GitResult<String> {
        let mode = if hard { "--hard " } else { "" };
        self.git(&format!("reset {mode}{}", quote(hash))).await
    }

    // Remotes

    pub async fn fetch(&self, remote: Option<&str>) -> GitResult<String> {
        let remote = remote.unwrap_or(DEFAULT_REMOTE);
        self.git(&format!("fetch {}", quote(remote))).await
    }

    pub async fn pull(&self, remote: Option<&str>, branch: Option<&str>) -> GitResult<String> {
        let remote = remote.unwrap_or(DEFAULT_REMOTE);
        let branch = branch.unwrap_or(DEFAULT_BRANCH);
        self.git(&format!("pull {} {}", quote(remote), quote(branch))).await
    }

    pub async fn push(&self, remote: Option<&str>, branch: Option<&str>) -> GitResult<String> {
        let remote = remote.unwrap_or(DEFAULT_REMOTE);
        let branch = branch.unwrap_or(DEFAULT_BRANCH);
        self.git(&format!("push {} {}", quote(remote), quote(branch))).await
    }

    // Stash

    pub async fn stash(&self) -> GitResult<String> {
        self.git("stash").await
    }

    pub async fn stash_pop(&self) -> GitResult<String> {
        self.git("stash pop").await
    }

    /// Stash entries, most recent first
    pub async fn stash_list(&self) -> GitResult<Vec<StashEntry>> {
        let out = self.git("stash list").await?;
        Ok(parser::parse_stash_list(&out))
    }

    pub async fn stash_drop_latest(&self) -> GitResult<String> {
        self.git("stash drop").await
    }

    /// Drop one entry; `index` has the form `stash@{N}`
    pub async fn stash_drop(&self, index: &str) -> GitResult<String> {
        self.git(&format!("stash drop {}", quote(index))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every argument string and answers with a fixed output
    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<String>>,
        output: String,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, args: &str, _working_dir: &Path) -> GitResult<String> {
            self.calls.lock().unwrap().push(args.to_string());
            if args.starts_with("rev-parse --abbrev-ref") {
                return Err(GitError::Execution {
                    command: args.to_string(),
                    message: "unknown revision".to_string(),
                });
            }
            Ok(self.output.clone())
        }
    }

    fn repo_with(output: &str) -> (Arc<RecordingRunner>, Repository) {
        let runner = Arc::new(RecordingRunner {
            calls: Mutex::new(Vec::new()),
            output: output.to_string(),
        });
        let repo = Repository::new("/repo", runner.clone());
        (runner, repo)
    }

    #[tokio::test]
    async fn test_commit_message_is_quoted() {
        let (runner, repo) = repo_with("");
        repo.commit("fix \"quoted\" bug").await.unwrap();
        assert_eq!(
            runner.calls.lock().unwrap()[0],
            r#"commit -m "fix \"quoted\" bug""#
        );
    }

    #[tokio::test]
    async fn test_remote_defaults() {
        let (runner, repo) = repo_with("");
        repo.push(None, None).await.unwrap();
        repo.pull(Some("upstream"), Some("dev")).await.unwrap();
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0], r#"push "origin" "main""#);
        assert_eq!(calls[1], r#"pull "upstream" "dev""#);
    }

    #[tokio::test]
    async fn test_log_limit() {
        let (runner, repo) = repo_with("a|b|2024-01-01|c");
        let repo = repo.with_history(HistoryConfig { max_commits: Some(5) });
        let commits = repo.log().await.unwrap();
        assert_eq!(commits.len(), 1);
        assert!(runner.calls.lock().unwrap()[0].ends_with(" -n 5"));
    }

    #[tokio::test]
    async fn test_all_branches_without_head() {
        let (_runner, repo) = repo_with("main");
        let branches = repo.all_branches().await.unwrap();
        assert_eq!(branches.len(), 2);
        assert!(!branches[0].is_remote);
        assert!(branches[1].is_remote);
        assert!(branches.iter().all(|b| !b.is_current));
    }

    #[tokio::test]
    async fn test_reset_modes() {
        let (runner, repo) = repo_with("");
        repo.reset("abc1234", true).await.unwrap();
        repo.reset("abc1234", false).await.unwrap();
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0], r#"reset --hard "abc1234""#);
        assert_eq!(calls[1], r#"reset "abc1234""#);
    }

    #[tokio::test]
    async fn test_path_commands_end_options() {
        let (runner, repo) = repo_with("");
        repo.add(None).await.unwrap();
        repo.add(Some("-A")).await.unwrap();
        repo.reset_file("notes").await.unwrap();
        repo.remove_file("a.txt").await.unwrap();
        repo.remove_from_index("a.txt").await.unwrap();
        repo.move_file("old", "new").await.unwrap();
        let calls = runner.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                r#"add -- ".""#,
                r#"add -- "-A""#,
                r#"reset -- "notes""#,
                r#"rm -- "a.txt""#,
                r#"rm --cached -- "a.txt""#,
                r#"mv -- "old" "new""#,
            ]
        );
    }
}
