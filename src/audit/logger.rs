use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Append-only record of executed git commands
#[derive(Debug)]
pub struct CommandAudit {
    log_path: PathBuf,
    // Serializes rotate + append across concurrent commands
    write_lock: Mutex<()>,
}

impl CommandAudit {
    /// Open an audit log at `path`, creating parent directories
    pub fn with_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();

        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self {
            log_path,
            write_lock: Mutex::new(()),
        })
    }

    /// Append one entry:
    /// `[timestamp] [working dir] [exit:N] [Nms] git <args>`
    pub fn record(
        &self,
        command: &str,
        working_dir: &Path,
        exit_code: i32,
        elapsed: Duration,
    ) -> std::io::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        self.rotate_if_needed()?;

        let entry = format!(
            "[{}] [{}] [exit:{}] [{}ms] git {}\n",
            Utc::now().to_rfc3339(),
            working_dir.display(),
            exit_code,
            elapsed.as_millis(),
            command
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        file.write_all(entry.as_bytes())?;
        file.flush()
    }

    /// Rotate: commands.log -> commands.log.1 once over MAX_LOG_SIZE
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        match fs::metadata(&self.log_path) {
            Ok(metadata) if metadata.len() > MAX_LOG_SIZE => {
                fs::rename(&self.log_path, self.log_path.with_extension("log.1"))
            }
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
