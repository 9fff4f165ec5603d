// src/models/snapshot.rs

//! The aggregated view of all topics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Topic, TopicRecord};
use crate::services::defaults;

/// Name of the institution the data belongs to.
pub const INSTITUTION: &str = "Westfälische Hochschule";

/// All topic data from one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub registration: Vec<TopicRecord>,
    pub exams: Vec<TopicRecord>,
    pub news: Vec<TopicRecord>,
    pub last_updated: DateTime<Utc>,
    pub institution: String,
}

impl Snapshot {
    pub fn new(
        registration: Vec<TopicRecord>,
        exams: Vec<TopicRecord>,
        news: Vec<TopicRecord>,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            registration,
            exams,
            news,
            last_updated,
            institution: INSTITUTION.to_string(),
        }
    }

    /// Snapshot built only from the hard-coded default sets.
    pub fn with_defaults(now: DateTime<Utc>) -> Self {
        Self::new(
            defaults::default_registration(),
            defaults::default_exams(),
            defaults::default_news(),
            now,
        )
    }

    /// Records for a single topic.
    pub fn records(&self, topic: Topic) -> &[TopicRecord] {
        match topic {
            Topic::Registration => &self.registration,
            Topic::Exams => &self.exams,
            Topic::News => &self.news,
        }
    }

    /// Total number of records across all topics.
    pub fn record_count(&self) -> usize {
        self.registration.len() + self.exams.len() + self.news.len()
    }
}
