use crate::audit::CommandAudit;
use crate::config::GitConfig;
use crate::error::{GitError, GitResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Result of executing a git command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

/// Runs version-control subcommands against a working directory.
///
/// `args` is everything after the binary name, e.g. `status --short`.
/// Arguments are split by [`split_args`], never by a shell. Implementations
/// return the trimmed standard output on success.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &str, working_dir: &Path) -> GitResult<String>;
}

/// Executes git commands as subprocesses
#[derive(Debug)]
pub struct GitExecutor {
    binary: String,
    timeout: Duration,
    audit: Option<CommandAudit>,
}

impl GitExecutor {
    /// Create an executor for the `git` on PATH with a 30s timeout
    pub fn new() -> Self {
        Self {
            binary: "git".to_string(),
            timeout: Duration::from_secs(30),
            audit: None,
        }
    }

    pub fn from_config(config: &GitConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            audit: None,
        }
    }

    /// Record every executed command in the given audit log
    pub fn with_audit(mut self, audit: CommandAudit) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute a git command and return the full output
    ///
    /// The command string should not include the binary name.
    /// Example: `executor.execute("status --short", path)`
    pub async fn execute(&self, command: &str, working_dir: &Path) -> GitResult<CommandOutput> {
        let args = split_args(command)?;
        log::debug!("git {} (in {})", command, working_dir.display());

        let mut cmd = Command::new(&self.binary);
        cmd.args(&args)
            .current_dir(working_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                self.audit_command(command, working_dir, -1, started.elapsed());
                return Err(GitError::Execution {
                    command: command.to_string(),
                    message: format!("Failed to execute {}: {}", self.binary, e),
                });
            }
            Err(_) => {
                self.audit_command(command, working_dir, -1, started.elapsed());
                return Err(GitError::Timeout {
                    command: command.to_string(),
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let cmd_output = process_output(output);
        self.audit_command(command, working_dir, cmd_output.exit_code, started.elapsed());

        if !cmd_output.success {
            let stderr = cmd_output.stderr.trim();
            let message = if stderr.is_empty() {
                format!("exited with code {}", cmd_output.exit_code)
            } else {
                stderr.to_string()
            };
            return Err(GitError::Execution {
                command: command.to_string(),
                message,
            });
        }

        Ok(cmd_output)
    }

    fn audit_command(&self, command: &str, working_dir: &Path, exit_code: i32, elapsed: Duration) {
        if let Some(audit) = &self.audit
            && let Err(e) = audit.record(command, working_dir, exit_code, elapsed)
        {
            log::warn!("Failed to write audit entry for 'git {}': {}", command, e);
        }
    }
}

impl Default for GitExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for GitExecutor {
    async fn run(&self, args: &str, working_dir: &Path) -> GitResult<String> {
        let output = self.execute(args, working_dir).await?;
        Ok(output.stdout.trim().to_string())
    }
}

fn process_output(output: Output) -> CommandOutput {
    CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
        success: output.status.success(),
    }
}

/// Split an argument string into arguments without a shell.
///
/// Whitespace separates arguments. Double quotes group text and are removed;
/// inside quotes a backslash escapes `"` and `\`.
pub fn split_args(command: &str) -> GitResult<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut chars = command.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            '\\' if in_quotes => match chars.peek() {
                Some('"') | Some('\\') => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                _ => current.push(c),
            },
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_quotes {
        return Err(GitError::InvalidArguments(format!(
            "Unterminated quote in: {}",
            command
        )));
    }
    if in_token {
        args.push(current);
    }
    if args.is_empty() {
        return Err(GitError::InvalidArguments("Empty command".to_string()));
    }

    Ok(args)
}

/// Quote a value so it survives [`split_args`] as a single argument
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
