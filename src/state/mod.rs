pub mod notifier;
pub mod registry;
pub mod repository_state;
pub mod snapshot;

pub use notifier::{ChangeNotifier, SubscriptionId};
pub use registry::RepositoryRegistry;
pub use repository_state::RepositoryState;
pub use snapshot::{Lifecycle, RepositorySnapshot};
