// src/services/extractors/news.rs

//! News from the RSS feed, with the news page as a second source.

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;
use scraper::Html;
use url::Url;

use super::{TopicExtractor, element_text, first_text, nothing_found, parse_selector};
use crate::error::{AppError, Result};
use crate::models::{SourcesConfig, Topic, TopicRecord};
use crate::utils::http::PageFetcher;
use crate::utils::{char_len, format_feed_date, normalize_whitespace, resolve_url, strip_tags, truncate};

/// Date label of news without a usable publication date.
pub const CURRENT: &str = "Aktuell";

const MAX_ITEMS: usize = 5;
const MIN_TITLE_LEN: usize = 10;
const MAX_TITLE_LEN: usize = 100;
const MAX_CONTENT_LEN: usize = 200;

const PAGE_ITEM_SELECTOR: &str = ".news-item, .aktuell, .meldung, article, h2, h3";
const PAGE_HEADING_SELECTOR: &str = "h1, h2, h3, .title, .headline";
const PAGE_BODY_SELECTOR: &str = "p, .content, .text";
const PAGE_LINK_SELECTOR: &str = "a[href]";

/// Raw fields of one `<item>`.
#[derive(Debug, Default)]
struct FeedItem {
    title: String,
    description: String,
    pub_date: String,
    link: String,
}

impl FeedItem {
    fn push(&mut self, field: &str, text: &str) {
        let target = match field {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "pubDate" => &mut self.pub_date,
            "link" => &mut self.link,
            _ => return,
        };
        target.push_str(text);
    }

    /// Items with a short or missing title are dropped.
    fn into_record(self) -> Option<TopicRecord> {
        let title = normalize_whitespace(&self.title);
        if char_len(&title) <= MIN_TITLE_LEN {
            return None;
        }

        let date = format_feed_date(&self.pub_date).unwrap_or_else(|| CURRENT.to_string());
        let mut record = TopicRecord::new(
            "RSS News",
            truncate(&title, MAX_TITLE_LEN),
            date,
            "w-hs.de RSS",
        );

        let content = normalize_whitespace(&strip_tags(&self.description));
        if !content.is_empty() {
            record = record.with_content(truncate(&content, MAX_CONTENT_LEN));
        }
        let link = self.link.trim();
        if !link.is_empty() {
            record = record.with_link(link);
        }
        Some(record)
    }
}

/// Parse the first items of an RSS feed into news records.
pub fn parse_feed(xml: &str) -> Result<Vec<TopicRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut items = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut field = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "item" {
                    current = Some(FeedItem::default());
                } else {
                    field = name;
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                    if items.len() >= MAX_ITEMS {
                        break;
                    }
                }
                field.clear();
            }
            Ok(Event::Text(e)) => {
                if let Some(item) = current.as_mut() {
                    let text = e
                        .unescape()
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                    item.push(&field, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(item) = current.as_mut() {
                    item.push(&field, &String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::Feed(format!(
                    "XML parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(items.into_iter().filter_map(FeedItem::into_record).collect())
}

/// Scan a regular news page for headlines.
///
/// Headlines follow the feed's length rules. Relative links are resolved against `page_url`.
pub fn parse_news_page(body: &str, page_url: &str) -> Result<Vec<TopicRecord>> {
    let document = Html::parse_document(body);
    let item_selector = parse_selector(PAGE_ITEM_SELECTOR)?;
    let heading_selector = parse_selector(PAGE_HEADING_SELECTOR)?;
    let body_selector = parse_selector(PAGE_BODY_SELECTOR)?;
    let link_selector = parse_selector(PAGE_LINK_SELECTOR)?;
    let base = Url::parse(page_url).ok();

    let records = document
        .select(&item_selector)
        .take(MAX_ITEMS)
        .filter_map(|item| {
            let text = element_text(&item);
            if text.is_empty() {
                return None;
            }

            let mut title = first_text(&item, &heading_selector);
            if title.is_empty() {
                title = item
                    .text()
                    .flat_map(str::lines)
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .map(normalize_whitespace)
                    .unwrap_or_default();
            }
            if char_len(&title) <= MIN_TITLE_LEN {
                return None;
            }

            let mut content = first_text(&item, &body_selector);
            if content.is_empty() {
                content = text;
            }

            let mut record =
                TopicRecord::new("Web News", truncate(&title, MAX_TITLE_LEN), CURRENT, "w-hs.de");
            if content != title {
                record = record.with_content(truncate(&content, MAX_CONTENT_LEN));
            }

            let href = item
                .select(&link_selector)
                .next()
                .and_then(|a| a.value().attr("href"));
            if let Some(href) = href {
                let link = match &base {
                    Some(base) => resolve_url(base, href),
                    None => href.to_string(),
                };
                record = record.with_link(link);
            }
            Some(record)
        })
        .collect();
    Ok(records)
}

/// Extractor for current news.
pub struct NewsExtractor {
    fetcher: PageFetcher,
    feed_url: String,
    fallback_url: String,
}

impl NewsExtractor {
    pub fn new(fetcher: PageFetcher, sources: &SourcesConfig) -> Self {
        Self {
            fetcher,
            feed_url: sources.news_feed_url.clone(),
            fallback_url: sources.news_fallback_url.clone(),
        }
    }

    async fn scan_page(&self) -> Result<Vec<TopicRecord>> {
        let body = self.fetcher.fetch(&self.fallback_url).await?;
        match parse_news_page(&body, &self.fallback_url) {
            Ok(records) => Ok(records),
            Err(e) => {
                log::warn!("Could not parse {}: {}", self.fallback_url, e);
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl TopicExtractor for NewsExtractor {
    fn topic(&self) -> Topic {
        Topic::News
    }

    async fn scrape(&self) -> Result<Vec<TopicRecord>> {
        let feed = self.fetcher.fetch(&self.feed_url).await?;
        let items = parse_feed(&feed).unwrap_or_else(|e| {
            log::warn!("Unreadable feed at {}: {}", self.feed_url, e);
            Vec::new()
        });
        if !items.is_empty() {
            return Ok(items);
        }

        log::info!("Feed had no usable items, scanning {}", self.fallback_url);
        let records = self.scan_page().await?;
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

    const FEED_URL: &str = "https://www.w-hs.de/rss/";
    const PAGE_URL: &str = "https://www.w-hs.de/aktuelles/";

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Westfälische Hochschule</title>
    <item>
      <title>Neue Prüfungsordnung für Informatik</title>
      <link>https://www.w-hs.de/news/1</link>
      <description>&lt;p&gt;Die &lt;b&gt;neue&lt;/b&gt; Ordnung gilt ab sofort.&lt;/p&gt;</description>
      <pubDate>Mon, 13 Jan 2025 09:00:00 +0100</pubDate>
    </item>
    <item>
      <title>Kurz</title>
      <description>Zu kurzer Titel</description>
    </item>
    <item>
      <title><![CDATA[Campus-Portal wird gewartet]]></title>
      <description><![CDATA[<p>Am Wochenende ist das Portal nicht erreichbar.</p>]]></description>
      <pubDate>kein Datum</pubDate>
    </item>
  </channel>
</rss>"#;

    const NEWS_PAGE: &str = r#"
        <html><body>
          <div class="meldung">
            <h3><a href="/aktuelles/bibliothek">Bibliothek verlängert Öffnungszeiten</a></h3>
            <p>Ab Februar bis 22 Uhr geöffnet.</p>
          </div>
        </body></html>
    "#;

    fn sources() -> SourcesConfig {
        SourcesConfig {
            news_feed_url: FEED_URL.to_string(),
            news_fallback_url: PAGE_URL.to_string(),
            ..SourcesConfig::default()
        }
    }

    #[test]
    fn test_parse_feed() {
        let records = parse_feed(FEED).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.kind, "RSS News");
        assert_eq!(first.description, "Neue Prüfungsordnung für Informatik");
        assert_eq!(first.date, "13.01.2025");
        assert_eq!(first.content.as_deref(), Some("Die neue Ordnung gilt ab sofort."));
        assert_eq!(first.link.as_deref(), Some("https://www.w-hs.de/news/1"));

        let second = &records[1];
        assert_eq!(second.description, "Campus-Portal wird gewartet");
        assert_eq!(second.date, CURRENT);
        assert_eq!(
            second.content.as_deref(),
            Some("Am Wochenende ist das Portal nicht erreichbar.")
        );
        assert!(second.link.is_none());
    }

    #[test]
    fn test_parse_feed_takes_first_items_only() {
        let items: String = (1..=8)
            .map(|i| format!("<item><title>Meldung Nummer {i} der Woche</title></item>"))
            .collect();
        let xml = format!("<rss><channel>{items}</channel></rss>");

        let records = parse_feed(&xml).unwrap();
        assert_eq!(records.len(), MAX_ITEMS);
        assert_eq!(records[4].description, "Meldung Nummer 5 der Woche");
    }

    #[test]
    fn test_parse_feed_truncates_long_fields() {
        let title = "Sehr lange Überschrift ".repeat(10);
        let description = "Inhalt ".repeat(60);
        let xml = format!(
            "<rss><channel><item><title>{title}</title><description>{description}</description></item></channel></rss>"
        );

        let records = parse_feed(&xml).unwrap();
        assert_eq!(char_len(&records[0].description), MAX_TITLE_LEN);
        assert!(records[0].description.ends_with("..."));
        let content = records[0].content.as_deref().unwrap();
        assert_eq!(char_len(content), MAX_CONTENT_LEN);
    }

    #[test]
    fn test_parse_news_page_resolves_links() {
        let records = parse_news_page(NEWS_PAGE, PAGE_URL).unwrap();
        // The .meldung block and its h3 both match
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.kind, "Web News");
        assert_eq!(first.description, "Bibliothek verlängert Öffnungszeiten");
        assert_eq!(first.content.as_deref(), Some("Ab Februar bis 22 Uhr geöffnet."));
        assert_eq!(
            first.link.as_deref(),
            Some("https://www.w-hs.de/aktuelles/bibliothek")
        );
        assert_eq!(first.date, CURRENT);
    }

    #[test]
    fn test_parse_news_page_skips_short_headings() {
        let body = "<h2>Presse</h2><h3>Kontakt</h3><h2>Hochschule feiert Jubiläum</h2>";
        let records = parse_news_page(body, PAGE_URL).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "Hochschule feiert Jubiläum");

        assert!(parse_news_page("<h2>Presse</h2><h3>Kontakt</h3>", PAGE_URL).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_feed_items_win_over_page() {
        let transport = Arc::new(
            StaticTransport::new()
                .page(FEED_URL, FEED)
                .page(PAGE_URL, NEWS_PAGE),
        );
        let extractor = NewsExtractor::new(fetcher(transport.clone()), &sources());

        let records = extractor.extract().await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.kind == "RSS News"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_broken_feed_falls_back_to_page() {
        let transport = StaticTransport::new()
            .page(FEED_URL, "<rss><channel><item><title>Kaputt")
            .page(PAGE_URL, NEWS_PAGE);
        let extractor = NewsExtractor::new(fetcher(Arc::new(transport)), &sources());

        let records = extractor.extract().await;
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r.kind == "Web News"));
    }

    #[tokio::test]
    async fn test_network_failure_returns_defaults() {
        let extractor = NewsExtractor::new(fetcher(Arc::new(DownTransport::default())), &sources());
        assert_eq!(extractor.extract().await, defaults::default_news());
    }
}
