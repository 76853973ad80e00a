use crate::config::{Config, HistoryConfig};
use crate::git::{CommandRunner, Repository, RepositoryLocator};
use crate::state::repository_state::RepositoryState;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One [`RepositoryState`] per resolved repository root.
///
/// Construct once and share by `Arc`. Asking again for a path that resolves
/// to an open root returns the same instance; a different root gets its own.
pub struct RepositoryRegistry {
    runner: Arc<dyn CommandRunner>,
    locator: RepositoryLocator,
    history: HistoryConfig,
    states: Mutex<HashMap<PathBuf, Arc<RepositoryState>>>,
}

impl RepositoryRegistry {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &Config) -> Self {
        Self {
            runner,
            locator: RepositoryLocator::new(&config.locator),
            history: config.history.clone(),
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `path` and return the state of its repository root,
    /// creating and fully refreshing it on first use.
    ///
    /// Returns `None` when the resolved root is not a repository; nothing is
    /// registered in that case.
    pub async fn get_or_create(&self, path: &Path) -> Option<Arc<RepositoryState>> {
        let root = self.resolve(path);

        // Held across initialization so concurrent first calls share one instance
        let mut states = self.states.lock().await;
        if let Some(state) = states.get(&root) {
            return Some(state.clone());
        }

        let repo = Repository::new(&root, self.runner.clone()).with_history(self.history.clone());
        let state = Arc::new(RepositoryState::new(repo));
        if !state.initialize().await {
            log::info!("{} is not a git repository", root.display());
            return None;
        }

        log::info!("Opened repository state for {}", root.display());
        states.insert(root, state.clone());
        Some(state)
    }

    /// Existing state for `path`, without creating one
    pub async fn get(&self, path: &Path) -> Option<Arc<RepositoryState>> {
        let root = self.resolve(path);
        self.states.lock().await.get(&root).cloned()
    }

    /// Roots with an open state
    pub async fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self.states.lock().await.keys().cloned().collect();
        roots.sort();
        roots
    }

    /// Locator result, canonicalized when the path exists
    fn resolve(&self, path: &Path) -> PathBuf {
        let root = self.locator.resolve(path);
        root.canonicalize().unwrap_or(root)
    }
}

impl std::fmt::Debug for RepositoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryRegistry")
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}
