use crate::error::{GitError, GitResult};
use crate::git::executor::CommandRunner;
use std::path::Path;

/// Minimum required git version
const MIN_GIT_VERSION: (u32, u32) = (2, 20);

/// Installed git version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GitVersion {
    /// Ask the runner's binary for its version
    pub async fn detect(runner: &dyn CommandRunner, working_dir: &Path) -> GitResult<Self> {
        let out = runner
            .run("--version", working_dir)
            .await
            .map_err(|e| GitError::GitVersionDetectionFailed(e.to_string()))?;
        Self::parse(&out)
    }

    /// Detect and reject versions older than the minimum
    pub async fn validate(runner: &dyn CommandRunner, working_dir: &Path) -> GitResult<Self> {
        let version = Self::detect(runner, working_dir).await?;
        if !version.is_supported() {
            return Err(GitError::GitVersionTooOld(version.to_string()));
        }
        Ok(version)
    }

    /// Parse `git version X.Y[.Z][.suffix]`
    pub fn parse(version_str: &str) -> GitResult<Self> {
        let number = version_str
            .trim()
            .strip_prefix("git version ")
            .and_then(|rest| rest.split_whitespace().next())
            .ok_or_else(|| {
                GitError::ParseError(format!("Unexpected git version format: {}", version_str))
            })?;

        let mut nums = number.split('.');
        let mut component = |label: &str| -> GitResult<u32> {
            let raw = nums.next().unwrap_or("");
            raw.parse::<u32>()
                .map_err(|_| GitError::ParseError(format!("Invalid {} version: {}", label, raw)))
        };

        let major = component("major")?;
        let minor = component("minor")?;
        // Patch may carry a suffix such as "2.windows" or be absent
        let patch = nums.next().and_then(|p| p.parse().ok()).unwrap_or(0);

        Ok(GitVersion { major, minor, patch })
    }

    pub fn is_supported(&self) -> bool {
        (self.major, self.minor) >= MIN_GIT_VERSION
    }
}

impl std::fmt::Display for GitVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
