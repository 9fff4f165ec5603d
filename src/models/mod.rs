// src/models/mod.rs

//! Domain models for the helper bot.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod period;
mod record;
mod snapshot;

// Re-export all public types
pub use config::{
    CacheConfig, Config, FetcherConfig, LoggingConfig, ScheduleConfig, ServerConfig,
    SourcesConfig,
};
pub use period::{CAMPUS_PORTAL, PROGRAM, PROGRAM_PERIODS, PROGRAM_SOURCE, StructuredPeriod};
pub use record::{DATE_PLACEHOLDER, Topic, TopicRecord};
pub use snapshot::{INSTITUTION, Snapshot};
