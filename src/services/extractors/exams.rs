// src/services/extractors/exams.rs

//! Exam periods: static program periods plus dated announcements.

use async_trait::async_trait;
use scraper::Html;

use super::{
    MAX_LIVE_RECORDS, TopicExtractor, contains_any, element_text, first_text, nothing_found,
    parse_selector,
};
use crate::error::Result;
use crate::models::{PROGRAM, PROGRAM_PERIODS, PROGRAM_SOURCE, SourcesConfig, Topic, TopicRecord};
use crate::utils::http::PageFetcher;
use crate::utils::{extract_date, truncate};

const ANNOUNCEMENT_SELECTOR: &str = ".news-item, .bekanntmachung, article";
const HEADING_SELECTOR: &str = "h1, h2, h3, .title";
const KEYWORDS: &[&str] = &["prüfung", "klausur"];
const MAX_DESCRIPTION_LEN: usize = 80;

/// Exam records for every window of the static period table.
pub fn structured_exam_records() -> Vec<TopicRecord> {
    PROGRAM_PERIODS
        .iter()
        .flat_map(|period| {
            period.exam_windows.iter().enumerate().map(move |(i, window)| {
                let mut record = TopicRecord::new(
                    format!("{PROGRAM} Prüfungsperiode"),
                    format!("{} - Zeitraum {}", period.name, i + 1),
                    *window,
                    PROGRAM_SOURCE,
                )
                .with_department(PROGRAM);
                if let Some(registration) = period.registration_for(i) {
                    record = record.with_registration_window(registration);
                }
                record
            })
        })
        .collect()
}

/// Scan the program page for dated exam announcements.
///
/// A block qualifies when it mentions exams or its heading names the
/// program. Undated blocks are skipped.
pub fn parse_exam_announcements(body: &str) -> Result<Vec<TopicRecord>> {
    let document = Html::parse_document(body);
    let item_selector = parse_selector(ANNOUNCEMENT_SELECTOR)?;
    let heading_selector = parse_selector(HEADING_SELECTOR)?;
    let program = PROGRAM.to_lowercase();

    let mut records = Vec::new();
    for item in document.select(&item_selector) {
        let text = element_text(&item);
        let title = first_text(&item, &heading_selector);

        let relevant = contains_any(&text.to_lowercase(), KEYWORDS)
            || title.to_lowercase().contains(&program);
        if !relevant {
            continue;
        }
        let Some(date) = extract_date(&text) else {
            continue;
        };

        let description = if title.is_empty() {
            truncate(&text, MAX_DESCRIPTION_LEN)
        } else {
            title
        };
        records.push(
            TopicRecord::new(
                format!("{PROGRAM} Ankündigung"),
                description,
                date,
                PROGRAM_SOURCE,
            )
            .with_department(PROGRAM),
        );

        if records.len() >= MAX_LIVE_RECORDS {
            break;
        }
    }
    Ok(records)
}

/// Extractor for exam periods.
pub struct ExamExtractor {
    fetcher: PageFetcher,
    program_url: String,
}

impl ExamExtractor {
    pub fn new(fetcher: PageFetcher, sources: &SourcesConfig) -> Self {
        Self {
            fetcher,
            program_url: sources.program_url.clone(),
        }
    }
}

#[async_trait]
impl TopicExtractor for ExamExtractor {
    fn topic(&self) -> Topic {
        Topic::Exams
    }

    async fn scrape(&self) -> Result<Vec<TopicRecord>> {
        let body = self.fetcher.fetch(&self.program_url).await?;

        let mut records = structured_exam_records();
        match parse_exam_announcements(&body) {
            Ok(found) => {
                log::debug!("Found {} announcements on {}", found.len(), self.program_url);
                records.extend(found);
            }
            Err(e) => log::warn!("Could not parse {}: {}", self.program_url, e),
        }

        if records.is_empty() {
            return Err(nothing_found(self.topic()));
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::services::defaults;
    use crate::utils::http::testing::{DownTransport, StaticTransport, fetcher};

    const PROGRAM_PAGE: &str = r#"
        <html><body>
          <div class="news-item">
            <h2>Klausurplan veröffentlicht</h2>
            <p>Der Prüfungsplan gilt ab 27.01.2025.</p>
          </div>
          <article>
            <h3>Informatik Kolloquium</h3>
            <p>Vortrag am 12.03.2025 im Hörsaal.</p>
          </article>
          <div class="bekanntmachung">Neue Prüfungsordnung in Kraft</div>
          <article>
            <h2>Sommerfest</h2>
            <p>Am 05.07.2025 feiern wir.</p>
          </article>
          <div class="bekanntmachung">Klausureinsicht am 14.02.2025 nach Absprache mit den Lehrenden im Büro des Prüfungsamts während der Sprechzeiten</div>
        </body></html>
    "#;

    fn sources() -> SourcesConfig {
        SourcesConfig {
            program_url: "https://www.w-hs.de/informatik/".to_string(),
            ..SourcesConfig::default()
        }
    }

    #[test]
    fn test_structured_records_cover_every_window() {
        let records = structured_exam_records();
        let windows: usize = PROGRAM_PERIODS.iter().map(|p| p.exam_windows.len()).sum();
        assert_eq!(records.len(), windows);

        let first = &records[0];
        assert_eq!(first.kind, "Informatik Prüfungsperiode");
        assert_eq!(first.description, "Prüfungsperiode 1 - Zeitraum 1");
        assert_eq!(
            first.registration_window.as_deref(),
            Some("30.12.24 - 12.01.25")
        );
        assert!(records.iter().all(|r| r.is_for(PROGRAM)));
    }

    #[test]
    fn test_parse_exam_announcements() {
        let records = parse_exam_announcements(PROGRAM_PAGE).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].description, "Klausurplan veröffentlicht");
        assert_eq!(records[0].date, "27.01.2025");
        // Matched through its heading
        assert_eq!(records[1].description, "Informatik Kolloquium");
        assert_eq!(records[1].date, "12.03.2025");
        // No heading, description falls back to the text
        assert_eq!(records[2].date, "14.02.2025");
        assert!(records[2].description.starts_with("Klausureinsicht am"));
        assert!(records[2].description.ends_with("..."));
        assert!(records.iter().all(|r| r.kind == "Informatik Ankündigung"));
    }

    #[tokio::test]
    async fn test_scrape_appends_announcements() {
        let transport = StaticTransport::new().page("https://www.w-hs.de/informatik/", PROGRAM_PAGE);
        let extractor = ExamExtractor::new(fetcher(Arc::new(transport)), &sources());

        let records = extractor.extract().await;
        assert_eq!(records.len(), structured_exam_records().len() + 3);
    }

    #[tokio::test]
    async fn test_network_failure_returns_defaults() {
        let extractor = ExamExtractor::new(fetcher(Arc::new(DownTransport::default())), &sources());
        assert_eq!(extractor.extract().await, defaults::default_exams());
    }
}
