// src/models/mod.rs

//! Domain models for the offer watcher.

mod config;
mod offer;
mod target;

// Re-export all public types
pub use config::{
    Config, ExtractConfig, LoggingConfig, MailConfig, RowLayout, SnapshotConfig, SourceConfig,
};
pub use offer::Offer;
pub use target::NotificationTarget;
