pub mod settings;

pub use settings::{AuditConfig, Config, ConfigError, GitConfig, HistoryConfig, LocatorConfig};
