//! Service layer for the helper.
//!
//! This module contains the business logic for:
//! - Topic caching (`TopicCache`)
//! - Per-topic extraction (`RegistrationExtractor`, `ExamExtractor`, `NewsExtractor`)
//! - Snapshot aggregation (`Aggregator`)
//! - Intent classification (`IntentClassifier`)
//! - Reply rendering (`Responder`)

pub mod aggregator;
pub mod cache;
pub mod defaults;
pub mod extractors;
pub mod intent;
pub mod responder;

pub use aggregator::Aggregator;
pub use cache::{CacheEntry, TopicCache};
pub use extractors::{ExamExtractor, NewsExtractor, RegistrationExtractor, TopicExtractor};
pub use intent::{Intent, IntentClassifier};
pub use responder::{FixedPicker, PhrasePicker, RandomPicker, Responder};
