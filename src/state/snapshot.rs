use crate::git::{BranchEntry, CommitEntry, StashEntry, UserIdentity};
use serde::Serialize;

/// Every cached fact about one repository.
///
/// A snapshot is immutable once published; a refresh builds a new one and
/// swaps it in whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositorySnapshot {
    pub user_identity: Option<UserIdentity>,
    /// `git status --short` output, kept verbatim
    pub status: Option<String>,
    pub branches: Vec<BranchEntry>,
    pub commit_history: Vec<CommitEntry>,
    pub stash_list: Vec<StashEntry>,
    pub initialized: bool,
}

impl RepositorySnapshot {
    /// Current branch as last cached, if any
    pub fn cached_current_branch(&self) -> Option<&BranchEntry> {
        self.branches.iter().find(|b| b.is_current)
    }

    pub fn is_clean(&self) -> bool {
        self.status.as_deref().is_some_and(str::is_empty)
    }
}

/// Lifecycle of a [`RepositoryState`](super::RepositoryState).
///
/// `Uninitialized -> Probing -> {Initialized, NotARepository}`. There is no
/// way back to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Lifecycle {
    Uninitialized,
    Probing,
    Initialized,
    NotARepository,
}
