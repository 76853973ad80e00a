pub mod executor;
pub mod locator;
pub mod parser;
pub mod repository;
pub mod version;

// Re-export commonly used types
pub use executor::{CommandOutput, CommandRunner, GitExecutor, quote, split_args};
pub use locator::RepositoryLocator;
pub use parser::{
    BranchEntry, CommitEntry, StashEntry, parse_branch_list, parse_branch_names, parse_log,
    parse_path_list, parse_stash_list,
};
pub use repository::{Repository, UserIdentity};
pub use version::GitVersion;
