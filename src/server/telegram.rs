// src/server/telegram.rs

//! Minimal Telegram Bot API client and update types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{FetcherConfig, ServerConfig};

/// Incoming webhook update. Only the fields the bot reads are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub from: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub first_name: Option<String>,
}

impl Update {
    /// Chat id and text of a plain text message.
    pub fn text_message(&self) -> Option<(i64, &str)> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        Some((message.chat.id, text))
    }

    /// Sender's first name, `Kumpel` when unknown.
    pub fn sender_name(&self) -> &str {
        self.message
            .as_ref()
            .and_then(|m| m.from.as_ref())
            .and_then(|u| u.first_name.as_deref())
            .unwrap_or("Kumpel")
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

/// Sends replies through `sendMessage`.
pub struct TelegramClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Client for the configured token, `None` when no token is set.
    pub fn from_config(server: &ServerConfig, fetcher: &FetcherConfig) -> Result<Option<Self>> {
        let Some(token) = server.telegram_token.as_deref() else {
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(fetcher.timeout_secs))
            .build()?;
        Ok(Some(Self::new(client, &server.telegram_api_base, token)))
    }

    /// Send `text` to `chat_id` as plain text.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        // The token is part of the URL and must stay out of errors and logs
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let response = self
            .client
            .post(&url)
            .json(&SendMessage { chat_id, text })
            .send()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status {
                url: format!("{}/bot<token>/sendMessage", self.api_base),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn test_update_parsing() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 1,
            "message": {
                "message_id": 7,
                "chat": { "id": 42, "type": "private" },
                "from": { "id": 5, "first_name": "Alex" },
                "text": "Wann sind Klausuren?"
            }
        }))
        .unwrap();
        assert_eq!(update.text_message(), Some((42, "Wann sind Klausuren?")));
        assert_eq!(update.sender_name(), "Alex");

        let sticker: Update = serde_json::from_value(json!({
            "update_id": 2,
            "message": { "message_id": 8, "chat": { "id": 42 }, "sticker": {} }
        }))
        .unwrap();
        assert_eq!(sticker.text_message(), None);
        assert_eq!(sticker.sender_name(), "Kumpel");

        let edited: Update = serde_json::from_value(json!({ "update_id": 3 })).unwrap();
        assert!(edited.message.is_none());
    }

    #[tokio::test]
    async fn test_send_message_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTEST:TOKEN/sendMessage"))
            .and(body_json(json!({ "chat_id": 42, "text": "Moin!" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::new(reqwest::Client::new(), server.uri(), "TEST:TOKEN");
        client.send_message(42, "Moin!").await.unwrap();
    }

    #[tokio::test]
    async fn test_send_message_reports_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = TelegramClient::new(reqwest::Client::new(), format!("{}/", server.uri()), "secret");
        let err = client.send_message(1, "x").await.unwrap_err();
        assert!(matches!(err, AppError::Status { status: 403, .. }));
        assert!(!err.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_connection_errors_hide_the_token() {
        let client = TelegramClient::new(reqwest::Client::new(), "http://127.0.0.1:9", "SECRET123:TOKEN");
        let err = client.send_message(1, "x").await.unwrap_err();
        assert!(err.is_network());

        let msg = err.to_string();
        assert!(!msg.contains("SECRET123"), "token leaked: {msg}");
        assert!(!format!("{err:?}").contains("SECRET123"));
    }

    #[test]
    fn test_no_token_no_client() {
        let client = TelegramClient::from_config(&ServerConfig::default(), &FetcherConfig::default()).unwrap();
        assert!(client.is_none());
    }
}
