// src/models/record.rs

//! Topic records produced by the extractors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Placeholder used when no `DD.MM.YYYY` date could be found.
pub const DATE_PLACEHOLDER: &str = "Datum siehe Website";

/// One of the tracked academic data categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Registration,
    Exams,
    News,
}

impl Topic {
    /// All topics in snapshot order.
    pub const ALL: [Topic; 3] = [Topic::Registration, Topic::Exams, Topic::News];

    /// Key under which the topic is cached.
    pub fn cache_key(&self) -> &'static str {
        match self {
            Topic::Registration => "anmeldung",
            Topic::Exams => "klausuren",
            Topic::News => "aktuelles",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache_key())
    }
}

impl FromStr for Topic {
    type Err = AppError;

    /// Accepts the cache key or the English name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Topic::ALL
            .into_iter()
            .find(|topic| s == topic.cache_key() || s == format!("{topic:?}").to_lowercase())
            .ok_or_else(|| AppError::validation(format!("Unknown topic '{s}'")))
    }
}

/// A normalized entry for one topic.
///
/// News items keep their headline in `description` and their body in
/// `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    /// Record type tag (e.g. "Informatik Prüfungsperiode")
    #[serde(rename = "type")]
    pub kind: String,

    /// Human-readable description or headline
    pub description: String,

    /// Free-form, locale-specific date text
    pub date: String,

    /// Registration window belonging to an exam period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_window: Option<String>,

    /// Exam window belonging to a registration period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_window: Option<String>,

    /// Time hint (e.g. "siehe Prüfungsplan")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Portal where registration happens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portal: Option<String>,

    /// Department or program the record belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Body text (news only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Link to the original page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Where the record came from
    pub source: String,
}

impl TopicRecord {
    /// Create a record with the mandatory fields set.
    ///
    /// An empty `date` is replaced by [`DATE_PLACEHOLDER`].
    pub fn new(
        kind: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let date = date.into();
        Self {
            kind: kind.into(),
            description: description.into(),
            date: if date.trim().is_empty() {
                DATE_PLACEHOLDER.to_string()
            } else {
                date
            },
            registration_window: None,
            exam_window: None,
            time: None,
            portal: None,
            department: None,
            content: None,
            link: None,
            source: source.into(),
        }
    }

    pub fn with_registration_window(mut self, window: impl Into<String>) -> Self {
        self.registration_window = Some(window.into());
        self
    }

    pub fn with_exam_window(mut self, window: impl Into<String>) -> Self {
        self.exam_window = Some(window.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_portal(mut self, portal: impl Into<String>) -> Self {
        self.portal = Some(portal.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Whether the record is tagged for the given department.
    pub fn is_for(&self, department: &str) -> bool {
        self.department.as_deref() == Some(department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_from_str() {
        assert_eq!("klausuren".parse::<Topic>().unwrap(), Topic::Exams);
        assert_eq!(" Registration ".parse::<Topic>().unwrap(), Topic::Registration);
        assert_eq!("aktuelles".parse::<Topic>().unwrap(), Topic::News);
        assert!("mensa".parse::<Topic>().is_err());
    }

    #[test]
    fn test_empty_date_falls_back_to_placeholder() {
        let record = TopicRecord::new("Anmeldung", "Bewerbung", "  ", "w-hs.de");
        assert_eq!(record.date, DATE_PLACEHOLDER);
    }

    #[test]
    fn test_serializes_kind_as_type() {
        let record = TopicRecord::new("Klausur", "Klausurphase", "20.01.2025", "Fallback")
            .with_department("Informatik");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "Klausur");
        assert_eq!(json["department"], "Informatik");
        assert!(json.get("link").is_none());
    }

    #[test]
    fn test_is_for() {
        let record = TopicRecord::new("x", "y", "z", "s").with_department("Informatik");
        assert!(record.is_for("Informatik"));
        assert!(!record.is_for("Maschinenbau"));
    }

    #[test]
    fn test_cache_keys_are_distinct() {
        let keys: std::collections::HashSet<_> =
            Topic::ALL.iter().map(|t| t.cache_key()).collect();
        assert_eq!(keys.len(), 3);
    }
}
