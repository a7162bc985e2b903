use std::time::Duration;

use serde::{Deserialize, Serialize};
use showwatch_core::ChatMessage;
use showwatch_logging::watch_info;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("rejected: {0}")]
    Rejected(String),
}

impl DeliveryError {
    // Request urls can embed credentials; keep them out of errors and logs.
    fn from_reqwest(err: reqwest::Error) -> Self {
        DeliveryError::Request(err.without_url().to_string())
    }
}

#[async_trait::async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn send_message(&self, message: &ChatMessage) -> Result<(), DeliveryError>;
}

#[async_trait::async_trait]
pub trait CallTrigger: Send + Sync {
    /// Fires a phone-call trigger identified by `value` (the movie name).
    async fn trigger_call(&self, value: &str) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
    pub timeout: Duration,
}

impl TelegramSettings {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Sends messages through the Telegram Bot API `sendMessage` method.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    settings: TelegramSettings,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    reply_markup: InlineKeyboard<'a>,
}

#[derive(Serialize)]
struct InlineKeyboard<'a> {
    inline_keyboard: Vec<Vec<InlineButton<'a>>>,
}

#[derive(Serialize)]
struct InlineButton<'a> {
    text: &'a str,
    url: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(settings: TelegramSettings) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(DeliveryError::from_reqwest)?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.bot_token
        )
    }
}

#[async_trait::async_trait]
impl ChatNotifier for TelegramNotifier {
    async fn send_message(&self, message: &ChatMessage) -> Result<(), DeliveryError> {
        let payload = SendMessageRequest {
            chat_id: &self.settings.chat_id,
            text: &message.text,
            parse_mode: &message.parse_mode,
            reply_markup: InlineKeyboard {
                inline_keyboard: message
                    .buttons
                    .iter()
                    .map(|button| {
                        vec![InlineButton {
                            text: &button.text,
                            url: &button.url,
                        }]
                    })
                    .collect(),
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(DeliveryError::from_reqwest)?;

        // Error responses carry the same envelope, so decode before checking status.
        let status = response.status();
        let body = response.bytes().await.map_err(DeliveryError::from_reqwest)?;
        let api: ApiResponse = match serde_json::from_slice(&body) {
            Ok(api) => api,
            Err(_) if !status.is_success() => {
                return Err(DeliveryError::HttpStatus(status.as_u16()))
            }
            Err(err) => return Err(DeliveryError::InvalidResponse(err.to_string())),
        };

        if !api.ok {
            return Err(DeliveryError::Rejected(
                api.description
                    .unwrap_or_else(|| format!("status {}", status.as_u16())),
            ));
        }
        Ok(())
    }
}

/// Posts `{"value1": ...}` to an IFTTT-style webhook that places a call.
#[derive(Debug, Clone)]
pub struct WebhookCallTrigger {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    value1: &'a str,
}

impl WebhookCallTrigger {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let endpoint = endpoint.into();
        reqwest::Url::parse(&endpoint)
            .map_err(|err| DeliveryError::Request(format!("invalid webhook url: {err}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DeliveryError::from_reqwest)?;
        Ok(Self { endpoint, client })
    }
}

#[async_trait::async_trait]
impl CallTrigger for WebhookCallTrigger {
    async fn trigger_call(&self, value: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&WebhookPayload { value1: value })
            .send()
            .await
            .map_err(DeliveryError::from_reqwest)?;

        let status = response.status();
        let body = response.text().await.map_err(DeliveryError::from_reqwest)?;
        watch_info!("Call webhook responded {}: {}", status.as_u16(), body.trim());

        if !status.is_success() {
            return Err(DeliveryError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}
