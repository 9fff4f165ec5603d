// src/utils/http.rs

//! HTTP client utilities and the retrying page fetcher.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::FetcherConfig;

/// Status and body of a single HTTP GET.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The network capability the fetcher is built on.
///
/// Implementations perform exactly one request; retrying is up to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &FetcherConfig) -> Result<reqwest::Client> {
    let accept = HeaderValue::from_str(&config.accept)
        .map_err(|e| AppError::config(format!("Invalid accept header: {e}")))?;
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, accept);

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// [`Transport`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &FetcherConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<RawResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }
}

/// Fetches pages with a fixed-delay retry budget.
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn Transport>,
    retries: u32,
    retry_delay: Duration,
}

impl PageFetcher {
    pub fn new(transport: Arc<dyn Transport>, config: &FetcherConfig) -> Self {
        Self {
            transport,
            retries: config.retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Create a fetcher that talks to the network through reqwest.
    pub fn from_config(config: &FetcherConfig) -> Result<Self> {
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Fetch a page body using the configured retry budget.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        self.fetch_with_retries(url, self.retries).await
    }

    /// Fetch a page body, retrying up to `retries` more times.
    ///
    /// Non-2xx statuses and transport errors are retried alike. Once the
    /// budget is spent the last cause is returned inside [`AppError::Fetch`].
    pub async fn fetch_with_retries(&self, url: &str, retries: u32) -> Result<String> {
        let mut remaining = retries;
        let mut attempts = 0;

        loop {
            attempts += 1;
            log::debug!("Fetching {} (attempt {})", url, attempts);

            let error = match self.transport.get(url).await {
                Ok(response) if response.is_success() => return Ok(response.text()),
                Ok(response) => AppError::Status {
                    url: url.to_string(),
                    status: response.status,
                },
                Err(e) => e,
            };

            if remaining == 0 {
                log::warn!("Giving up on {} after {} attempt(s): {}", url, attempts, error);
                return Err(AppError::Fetch {
                    url: url.to_string(),
                    attempts,
                    source: Box::new(error),
                });
            }

            log::warn!(
                "Error fetching {}: {}. Retrying ({} attempts left)",
                url,
                error,
                remaining
            );
            remaining -= 1;
            tokio::time::sleep(self.retry_delay).await;
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transports shared by the extractor tests.

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Serves fixed bodies per URL; unknown URLs answer 404.
    #[derive(Default)]
    pub struct StaticTransport {
        pages: HashMap<String, (u16, String)>,
        calls: AtomicUsize,
    }

    impl StaticTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), (200, body.to_string()));
            self
        }

        pub fn status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), (status, String::new()));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for StaticTransport {
        async fn get(&self, url: &str) -> Result<RawResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (status, body) = self
                .pages
                .get(url)
                .cloned()
                .unwrap_or((404, String::new()));
            Ok(RawResponse {
                status,
                body: body.into_bytes(),
            })
        }
    }

    /// Answers every request with a connection-level failure.
    #[derive(Default)]
    pub struct DownTransport {
        calls: AtomicUsize,
    }

    impl DownTransport {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for DownTransport {
        async fn get(&self, url: &str) -> Result<RawResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Status {
                url: url.to_string(),
                status: 503,
            })
        }
    }

    /// Replays a list of statuses, then keeps answering with the last one.
    pub struct SequenceTransport {
        statuses: Mutex<Vec<u16>>,
        body: String,
    }

    impl SequenceTransport {
        pub fn new(statuses: &[u16], body: &str) -> Self {
            let mut statuses = statuses.to_vec();
            statuses.reverse();
            Self {
                statuses: Mutex::new(statuses),
                body: body.to_string(),
            }
        }
    }

    #[async_trait]
    impl Transport for SequenceTransport {
        async fn get(&self, _url: &str) -> Result<RawResponse> {
            let status = {
                let mut statuses = self.statuses.lock().unwrap();
                if statuses.len() > 1 {
                    statuses.pop().unwrap()
                } else {
                    statuses[0]
                }
            };
            Ok(RawResponse {
                status,
                body: self.body.clone().into_bytes(),
            })
        }
    }

    /// Fetcher without retry delay.
    pub fn fetcher(transport: Arc<dyn Transport>) -> PageFetcher {
        let config = FetcherConfig {
            retry_delay_ms: 0,
            ..FetcherConfig::default()
        };
        PageFetcher::new(transport, &config)
    }
}
