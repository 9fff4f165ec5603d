//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetching behavior
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Topic cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Periodic refresh settings
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Pages scraped per topic
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Webhook server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Relative source URLs are resolved against `sources.base_url`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.sources.resolve()?;
        Ok(config)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Override values from `PORT` and `TELEGRAM_TOKEN` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!("Ignoring invalid PORT value '{}'", port),
            }
        }

        if let Ok(token) = std::env::var("TELEGRAM_TOKEN") {
            if !token.trim().is_empty() {
                self.server.telegram_token = Some(token.trim().to_string());
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(AppError::validation("cache.ttl_secs must be > 0"));
        }
        if self.schedule.refresh_interval_secs == 0 {
            return Err(AppError::validation(
                "schedule.refresh_interval_secs must be > 0",
            ));
        }
        if self.sources.registration_urls.is_empty() {
            return Err(AppError::validation("No registration URLs defined"));
        }

        let urls = [
            &self.sources.base_url,
            &self.sources.program_url,
            &self.sources.news_feed_url,
            &self.sources.news_fallback_url,
        ];
        for url in urls.into_iter().chain(&self.sources.registration_urls) {
            url::Url::parse(url)
                .map_err(|e| AppError::validation(format!("Invalid source URL '{url}': {e}")))?;
        }
        Ok(())
    }
}

/// HTTP client and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept header for HTTP requests
    #[serde(default = "defaults::accept")]
    pub accept: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Retries after the first failed attempt
    #[serde(default = "defaults::retries")]
    pub retries: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept: defaults::accept(),
            timeout_secs: defaults::timeout(),
            retries: defaults::retries(),
            retry_delay_ms: defaults::retry_delay(),
        }
    }
}

/// Topic cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds an entry is served without refreshing
    #[serde(default = "defaults::ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: defaults::ttl(),
        }
    }
}

/// Periodic refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between two snapshot rebuilds
    #[serde(default = "defaults::refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: defaults::refresh_interval(),
        }
    }
}

/// Pages scraped for each topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// University homepage
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Informatik exam info page
    #[serde(default = "defaults::program_url")]
    pub program_url: String,

    /// Pages scanned for registration deadlines, in order
    #[serde(default = "defaults::registration_urls")]
    pub registration_urls: Vec<String>,

    /// RSS feed with press releases
    #[serde(default = "defaults::news_feed_url")]
    pub news_feed_url: String,

    /// Press page scanned when the feed is empty
    #[serde(default = "defaults::news_fallback_url")]
    pub news_fallback_url: String,
}

impl SourcesConfig {
    /// Rewrite every source URL to an absolute one, joined onto `base_url`.
    ///
    /// Absolute URLs are left as they are.
    pub fn resolve(&mut self) -> Result<()> {
        let base = url::Url::parse(&self.base_url)
            .map_err(|e| AppError::config(format!("Invalid base_url '{}': {e}", self.base_url)))?;
        let join = |url: &mut String| -> Result<()> {
            *url = base.join(url)?.to_string();
            Ok(())
        };

        join(&mut self.program_url)?;
        join(&mut self.news_feed_url)?;
        join(&mut self.news_fallback_url)?;
        for url in &mut self.registration_urls {
            join(url)?;
        }
        Ok(())
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            program_url: defaults::program_url(),
            registration_urls: defaults::registration_urls(),
            news_feed_url: defaults::news_feed_url(),
            news_fallback_url: defaults::news_fallback_url(),
        }
    }
}

/// Webhook server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the webhook server listens on
    #[serde(default = "defaults::port")]
    pub port: u16,

    /// Base URL of the Telegram Bot API
    #[serde(default = "defaults::telegram_api_base")]
    pub telegram_api_base: String,

    /// Bot token, usually supplied through `TELEGRAM_TOKEN`
    #[serde(default, skip_serializing)]
    pub telegram_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: defaults::port(),
            telegram_api_base: defaults::telegram_api_base(),
            telegram_token: None,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Fetcher defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
    }
    pub fn accept() -> String {
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn retries() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        2000
    }

    // Cache and schedule defaults
    pub fn ttl() -> u64 {
        30 * 60
    }
    pub fn refresh_interval() -> u64 {
        2 * 60 * 60
    }

    // Source defaults
    pub fn base_url() -> String {
        "https://www.w-hs.de".into()
    }
    pub fn program_url() -> String {
        "https://www.w-hs.de/informatik/info-center/pruefungen/".into()
    }
    pub fn registration_urls() -> Vec<String> {
        vec![
            "https://www.w-hs.de/studium/bewerbung-und-einschreibung/".into(),
            "https://www.w-hs.de/service/suche/?tx_kesearch_pi1%5Bfilter_1_%5D=event&tx_kesearch_pi1%5Bsword%5D=".into(),
        ]
    }
    pub fn news_feed_url() -> String {
        "https://www.w-hs.de/pressemedien/nachrichten-lesen?tx_news_categories=medieninformationen&type=9818&cHash=6c5876fbac126f047af9e77a9558a53d".into()
    }
    pub fn news_fallback_url() -> String {
        "https://www.w-hs.de/pressemedien/".into()
    }

    // Server defaults
    pub fn port() -> u16 {
        3000
    }
    pub fn telegram_api_base() -> String {
        "https://api.telegram.org".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
