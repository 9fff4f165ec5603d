// src/services/extractors/registration.rs

//! Registration windows: static program periods plus scraped deadlines.

use async_trait::async_trait;
use scraper::Html;

use super::{
    MAX_LIVE_RECORDS, TopicExtractor, contains_any, element_text, nothing_found, parse_selector,
};
use crate::error::Result;
use crate::models::{
    CAMPUS_PORTAL, DATE_PLACEHOLDER, PROGRAM, PROGRAM_PERIODS, PROGRAM_SOURCE, SourcesConfig,
    Topic, TopicRecord,
};
use crate::utils::http::PageFetcher;
use crate::utils::{extract_date_or, truncate};

const DEADLINE_SELECTOR: &str = "h2, h3, .termine, .deadline, .anmeldung, .bewerbung, .einschreibung";
const KEYWORDS: &[&str] = &["anmeldung", "bewerbung", "einschreibung"];
const MAX_DESCRIPTION_LEN: usize = 200;

/// Registration records for every window of the static period table.
pub fn structured_registration_records() -> Vec<TopicRecord> {
    PROGRAM_PERIODS
        .iter()
        .flat_map(|period| {
            period
                .registration_windows
                .iter()
                .enumerate()
                .map(move |(i, window)| {
                    let mut record = TopicRecord::new(
                        format!("{PROGRAM} Prüfungsanmeldung"),
                        format!("{} - Anmeldung {}", period.name, i + 1),
                        *window,
                        PROGRAM_SOURCE,
                    )
                    .with_portal(CAMPUS_PORTAL)
                    .with_department(PROGRAM);
                    if let Some(exam) = period.exam_for(i) {
                        record = record.with_exam_window(exam);
                    }
                    record
                })
        })
        .collect()
}

/// Scan a registration page for deadline headings and blocks.
pub fn parse_registration_page(body: &str) -> Result<Vec<TopicRecord>> {
    let document = Html::parse_document(body);
    let selector = parse_selector(DEADLINE_SELECTOR)?;

    let records = document
        .select(&selector)
        .map(|element| element_text(&element))
        .filter(|text| contains_any(&text.to_lowercase(), KEYWORDS))
        .take(MAX_LIVE_RECORDS)
        .map(|text| {
            TopicRecord::new(
                "Anmeldung/Bewerbung",
                truncate(&text, MAX_DESCRIPTION_LEN),
                extract_date_or(&text, DATE_PLACEHOLDER),
                "w-hs.de",
            )
        })
        .collect();
    Ok(records)
}

/// Extractor for registration periods.
pub struct RegistrationExtractor {
    fetcher: PageFetcher,
    urls: Vec<String>,
}

impl RegistrationExtractor {
    pub fn new(fetcher: PageFetcher, sources: &SourcesConfig) -> Self {
        Self {
            fetcher,
            urls: sources.registration_urls.clone(),
        }
    }

    /// Scan the registration pages in order; the first page with matches wins.
    ///
    /// Fails only when no page could be fetched at all.
    async fn scan_pages(&self) -> Result<Vec<TopicRecord>> {
        let mut last_error = None;
        let mut reachable = false;

        for url in &self.urls {
            let body = match self.fetcher.fetch(url).await {
                Ok(body) => body,
                Err(e) => {
                    log::warn!("Error scraping {}: {}", url, e);
                    last_error = Some(e);
                    continue;
                }
            };
            reachable = true;

            match parse_registration_page(&body) {
                Ok(found) if !found.is_empty() => {
                    log::debug!("Found {} registration entries on {}", found.len(), url);
                    return Ok(found);
                }
                Ok(_) => log::debug!("No registration entries on {}", url),
                Err(e) => log::warn!("Could not parse {}: {}", url, e),
            }
        }

        match last_error {
            Some(e) if !reachable => Err(e),
            _ => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl TopicExtractor for RegistrationExtractor {
    fn topic(&self) -> Topic {
        Topic::Registration
    }

    async fn scrape(&self) -> Result<Vec<TopicRecord>> {
        let mut records = structured_registration_records();
        records.extend(self.scan_pages().await?);

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

    const DEADLINES: &str = r#"
        <html><body>
          <h2>Studium an der WH</h2>
          <div class="deadline">Bewerbung für das Wintersemester bis 15.07.2025</div>
          <h3>Einschreibung</h3>
          <p class="anmeldung">Anmeldung zur Prüfung im Campus-Portal</p>
        </body></html>
    "#;

    fn sources() -> SourcesConfig {
        SourcesConfig {
            registration_urls: vec![
                "https://www.w-hs.de/bewerbung/".to_string(),
                "https://www.w-hs.de/suche/".to_string(),
            ],
            ..SourcesConfig::default()
        }
    }

    #[test]
    fn test_structured_records_cover_every_window() {
        let records = structured_registration_records();
        let windows: usize = PROGRAM_PERIODS
            .iter()
            .map(|p| p.registration_windows.len())
            .sum();
        assert_eq!(records.len(), windows);

        let first = &records[0];
        assert_eq!(first.description, "Prüfungsperiode 1 - Anmeldung 1");
        assert_eq!(first.date, "30.12.24 - 12.01.25");
        assert_eq!(first.exam_window.as_deref(), Some("27.01. - 31.01.2025"));
        assert_eq!(first.portal.as_deref(), Some(CAMPUS_PORTAL));
        assert!(first.is_for(PROGRAM));
    }

    #[test]
    fn test_parse_registration_page() {
        let records = parse_registration_page(DEADLINES).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].date, "15.07.2025");
        assert_eq!(records[1].description, "Einschreibung");
        assert_eq!(records[1].date, DATE_PLACEHOLDER);
        assert!(records.iter().all(|r| r.department.is_none()));
    }

    #[tokio::test]
    async fn test_scrape_appends_live_entries() {
        let transport = StaticTransport::new().page("https://www.w-hs.de/bewerbung/", DEADLINES);
        let extractor = RegistrationExtractor::new(fetcher(Arc::new(transport)), &sources());

        let records = extractor.extract().await;
        let structured = structured_registration_records();
        assert_eq!(records.len(), structured.len() + 3);
        assert_eq!(records[..structured.len()], structured[..]);
    }

    #[tokio::test]
    async fn test_first_page_with_matches_wins() {
        let transport = Arc::new(
            StaticTransport::new()
                .page("https://www.w-hs.de/bewerbung/", "<h2>Willkommen</h2>")
                .page("https://www.w-hs.de/suche/", DEADLINES),
        );
        let extractor = RegistrationExtractor::new(fetcher(transport.clone()), &sources());

        let live = extractor.scan_pages().await.unwrap();
        assert_eq!(live.len(), 3);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_network_failure_returns_defaults() {
        let extractor =
            RegistrationExtractor::new(fetcher(Arc::new(DownTransport::default())), &sources());

        assert!(extractor.scrape().await.is_err());
        assert_eq!(extractor.extract().await, defaults::default_registration());
    }
}
