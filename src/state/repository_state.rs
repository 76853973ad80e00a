use crate::error::GitResult;
use crate::git::{BranchEntry, CommitEntry, Repository, StashEntry, UserIdentity};
use crate::state::notifier::{ChangeNotifier, SubscriptionId};
use crate::state::snapshot::{Lifecycle, RepositorySnapshot};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Cached state of one repository root, shared by every observer.
///
/// Only the refresh methods mutate the snapshot, and they are serialized:
/// a refresh builds a complete new [`RepositorySnapshot`] and publishes it in
/// one swap, then fires the change notification.
///
/// Sub-refresh failures are logged and leave the affected field at its
/// previous value. `refresh_*` methods never return an error.
///
/// The point queries [`current_branch`](Self::current_branch),
/// [`branch_commits`](Self::branch_commits) and
/// [`all_branches`](Self::all_branches) run git directly and bypass the
/// cache, so they may be newer than [`branches`](Self::branches).
pub struct RepositoryState {
    repo: Repository,
    snapshot: RwLock<Arc<RepositorySnapshot>>,
    lifecycle: Mutex<Lifecycle>,
    refresh_lock: tokio::sync::Mutex<()>,
    notifier: ChangeNotifier,
}

impl RepositoryState {
    /// Create an uninitialized state with an empty snapshot
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            snapshot: RwLock::new(Arc::new(RepositorySnapshot::default())),
            lifecycle: Mutex::new(Lifecycle::Uninitialized),
            refresh_lock: tokio::sync::Mutex::new(()),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Probe the root and, when it is a repository, run a full refresh.
    ///
    /// Returns false and moves to [`Lifecycle::NotARepository`] otherwise.
    pub async fn initialize(&self) -> bool {
        let _guard = self.refresh_lock.lock().await;
        self.set_lifecycle(Lifecycle::Probing);

        if !self.repo.is_valid().await {
            self.set_lifecycle(Lifecycle::NotARepository);
            return false;
        }

        self.refresh_all_locked().await;
        self.set_lifecycle(Lifecycle::Initialized);
        true
    }

    /// Re-probe and refresh every field, firing one notification.
    ///
    /// If the probe fails the snapshot is left untouched and nothing fires.
    pub async fn refresh_all(&self) {
        let _guard = self.refresh_lock.lock().await;

        if !self.repo.is_valid().await {
            log::warn!(
                "Probe failed for {}; keeping previous snapshot",
                self.repo_path().display()
            );
            return;
        }

        self.refresh_all_locked().await;
    }

    async fn refresh_all_locked(&self) {
        log::debug!("Refreshing {}", self.repo_path().display());
        let mut next = (*self.snapshot()).clone();

        let identity = self.repo.user_identity().await.map(Some);
        self.apply("user identity", identity, &mut next.user_identity);
        let status = self.repo.status().await.map(Some);
        self.apply("status", status, &mut next.status);
        let branches = self.repo.branches().await;
        self.apply("branches", branches, &mut next.branches);
        let history = self.repo.log().await;
        self.apply("commit history", history, &mut next.commit_history);
        let stashes = self.repo.stash_list().await;
        self.apply("stash list", stashes, &mut next.stash_list);

        next.initialized = true;
        self.publish(next);
        self.notifier.fire();
    }

    pub async fn refresh_user_info(&self) {
        let _guard = self.refresh_lock.lock().await;
        let result = self.repo.user_identity().await.map(Some);
        self.update(|s| self.apply("user identity", result, &mut s.user_identity));
    }

    pub async fn refresh_status(&self) {
        let _guard = self.refresh_lock.lock().await;
        let result = self.repo.status().await.map(Some);
        self.update(|s| self.apply("status", result, &mut s.status));
    }

    pub async fn refresh_branches(&self) {
        let _guard = self.refresh_lock.lock().await;
        let result = self.repo.branches().await;
        self.update(|s| self.apply("branches", result, &mut s.branches));
    }

    pub async fn refresh_commit_history(&self) {
        let _guard = self.refresh_lock.lock().await;
        let result = self.repo.log().await;
        self.update(|s| self.apply("commit history", result, &mut s.commit_history));
    }

    pub async fn refresh_stash_list(&self) {
        let _guard = self.refresh_lock.lock().await;
        let result = self.repo.stash_list().await;
        self.update(|s| self.apply("stash list", result, &mut s.stash_list));
    }

    /// Store `result` in `slot`, or log and keep the old value
    fn apply<T>(&self, field: &str, result: GitResult<T>, slot: &mut T) {
        match result {
            Ok(value) => *slot = value,
            Err(e) => log::warn!(
                "Failed to refresh {} for {}: {}",
                field,
                self.repo_path().display(),
                e
            ),
        }
    }

    /// Publish a copy of the snapshot changed by `f`, then notify once
    fn update<F: FnOnce(&mut RepositorySnapshot)>(&self, f: F) {
        let mut next = (*self.snapshot()).clone();
        f(&mut next);
        self.publish(next);
        self.notifier.fire();
    }

    fn publish(&self, next: RepositorySnapshot) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
    }

    fn set_lifecycle(&self, lifecycle: Lifecycle) {
        *self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner) = lifecycle;
    }

    // Snapshot accessors

    /// The whole current snapshot; fields read from it are mutually consistent
    pub fn snapshot(&self) -> Arc<RepositorySnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn user_info(&self) -> Option<UserIdentity> {
        self.snapshot().user_identity.clone()
    }

    pub fn repo_status(&self) -> Option<String> {
        self.snapshot().status.clone()
    }

    pub fn branches(&self) -> Vec<BranchEntry> {
        self.snapshot().branches.clone()
    }

    pub fn commit_history(&self) -> Vec<CommitEntry> {
        self.snapshot().commit_history.clone()
    }

    pub fn stash_list(&self) -> Vec<StashEntry> {
        self.snapshot().stash_list.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.snapshot().initialized
    }

    pub fn repo_path(&self) -> &Path {
        self.repo.path()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Point queries, not cached

    pub async fn current_branch(&self) -> GitResult<String> {
        self.repo.current_branch().await
    }

    pub async fn branch_commits(&self, branch: &str) -> GitResult<Vec<CommitEntry>> {
        self.repo.branch_commits(branch).await
    }

    pub async fn all_branches(&self) -> GitResult<Vec<BranchEntry>> {
        self.repo.all_branches().await
    }

    /// Command layer for pass-through operations (commit, push, stash, ...).
    /// These never touch the snapshot; call a refresh afterwards.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // Notifications

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }
}

impl std::fmt::Debug for RepositoryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryState")
            .field("root", &self.repo_path())
            .field("lifecycle", &self.lifecycle())
            .field("notifier", &self.notifier)
            .finish()
    }
}
