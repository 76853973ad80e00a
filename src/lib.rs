pub mod audit;
pub mod config;
pub mod error;
pub mod git;
pub mod state;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{AppError, GitError, GitResult, Result};
pub use git::{CommandRunner, GitExecutor, GitVersion, Repository, RepositoryLocator};
pub use state::{ChangeNotifier, Lifecycle, RepositoryRegistry, RepositorySnapshot, RepositoryState};
