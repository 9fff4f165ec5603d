//! Hard-coded fallback records, one set per topic.
//!
//! Served whenever live extraction fails so that every topic always has
//! something to show.

use crate::models::{CAMPUS_PORTAL, PROGRAM, Topic, TopicRecord};

/// Source label of fallback records.
pub const FALLBACK_SOURCE: &str = "Fallback";

/// Default registration periods.
pub fn default_registration() -> Vec<TopicRecord> {
    vec![
        TopicRecord::new(
            "Informatik Prüfungsanmeldung",
            "Prüfungsperiode 1 - Anmeldung 1",
            "30.12.24 - 12.01.25",
            FALLBACK_SOURCE,
        )
        .with_exam_window("27.01. - 31.01.2025")
        .with_portal(CAMPUS_PORTAL)
        .with_department(PROGRAM),
        TopicRecord::new(
            "Anmeldung",
            "Anmeldung Wintersemester 2024/25",
            "15.10.2024",
            FALLBACK_SOURCE,
        ),
    ]
}

/// Default exam periods.
pub fn default_exams() -> Vec<TopicRecord> {
    vec![
        TopicRecord::new(
            "Informatik Prüfungsperiode",
            "Prüfungsperiode 1 - Zeitraum 1",
            "27.01. - 31.01.2025",
            FALLBACK_SOURCE,
        )
        .with_registration_window("30.12.24 - 12.01.25")
        .with_department(PROGRAM),
        TopicRecord::new(
            "Informatik Prüfungsperiode",
            "Prüfungsperiode 2",
            "30.06. - 11.07.2025",
            FALLBACK_SOURCE,
        )
        .with_registration_window("09.06. - 22.06.2025")
        .with_department(PROGRAM),
        TopicRecord::new(
            "Klausur",
            "Klausurphase Wintersemester",
            "20.01.2025 - 10.02.2025",
            FALLBACK_SOURCE,
        )
        .with_time("siehe Prüfungsplan"),
    ]
}

/// Default news.
pub fn default_news() -> Vec<TopicRecord> {
    vec![
        TopicRecord::new(
            "Default",
            "Aktuelle Informationen",
            "Aktuell",
            FALLBACK_SOURCE,
        )
        .with_content("Besuchen Sie die offizielle Website für die neuesten Ankündigungen."),
    ]
}

/// Default set for any topic.
pub fn for_topic(topic: Topic) -> Vec<TopicRecord> {
    match topic {
        Topic::Registration => default_registration(),
        Topic::Exams => default_exams(),
        Topic::News => default_news(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_never_empty() {
        for topic in Topic::ALL {
            let records = for_topic(topic);
            assert!(!records.is_empty());
            assert!(records.iter().all(|r| r.source == FALLBACK_SOURCE));
            assert!(records.iter().all(|r| !r.date.is_empty()));
        }
    }

    #[test]
    fn test_program_records_lead_the_defaults() {
        assert!(default_registration()[0].is_for(PROGRAM));
        assert!(default_exams()[0].is_for(PROGRAM));
    }
}
