pub mod logger;

pub use logger::CommandAudit;
