use crate::config::LocatorConfig;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory entry that marks a repository root
const METADATA_MARKER: &str = ".git";

/// Resolves a candidate path to the repository root it refers to
#[derive(Debug, Clone)]
pub struct RepositoryLocator {
    max_depth: usize,
    max_visited: usize,
}

impl RepositoryLocator {
    pub fn new(config: &LocatorConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_visited: config.max_visited,
        }
    }

    /// Whether `path` directly contains repository metadata
    pub fn is_root(path: &Path) -> bool {
        path.join(METADATA_MARKER).exists()
    }

    /// Resolve `candidate` to a repository root.
    ///
    /// Returns `candidate` unchanged when it is a root. Otherwise searches
    /// its subdirectories breadth-first, shallowest first, and returns the
    /// first root found. When nothing is found within the depth and visit
    /// caps, `candidate` is returned unchanged.
    pub fn resolve(&self, candidate: &Path) -> PathBuf {
        if Self::is_root(candidate) {
            return candidate.to_path_buf();
        }

        match self.search(candidate) {
            Some(root) => {
                log::debug!(
                    "Resolved {} to nested repository {}",
                    candidate.display(),
                    root.display()
                );
                root
            }
            None => candidate.to_path_buf(),
        }
    }

    fn search(&self, start: &Path) -> Option<PathBuf> {
        let mut queue: VecDeque<(PathBuf, usize)> = VecDeque::new();
        queue.push_back((start.to_path_buf(), 0));
        let mut visited = 0usize;

        while let Some((dir, depth)) = queue.pop_front() {
            if depth >= self.max_depth {
                continue;
            }

            for child in child_dirs(&dir) {
                visited += 1;
                if visited > self.max_visited {
                    log::debug!(
                        "Stopped repository search under {} after {} directories",
                        start.display(),
                        self.max_visited
                    );
                    return None;
                }

                if Self::is_root(&child) {
                    return Some(child);
                }
                queue.push_back((child, depth + 1));
            }
        }

        None
    }
}

impl Default for RepositoryLocator {
    fn default() -> Self {
        Self::new(&LocatorConfig::default())
    }
}

/// Real (non-symlink) subdirectories of `dir`, sorted by name.
/// Unreadable directories have no children.
fn child_dirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|entry| entry.file_name() != METADATA_MARKER)
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    dirs
}
