// src/services/publisher.rs

//! Telegram publish collaborator.
//!
//! Speaks the Bot API directly over HTTP. A configured @handle is resolved
//! to a numeric chat id once, via `getChat`, before the first publish and
//! cached for the process lifetime.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::OnceCell;

use crate::config::{ChannelTarget, Config};
use crate::error::{AppError, Result};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Seam for the external publish target.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Send a photo by URL to the configured channel.
    async fn send_photo(&self, image_url: &str, caption: &str) -> Result<()>;

    /// Send a plain-text notification to the configured administrator.
    /// A no-op when no administrator is configured.
    async fn notify_admin(&self, text: &str) -> Result<()>;
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChatInfo {
    id: i64,
}

/// Production publisher backed by the Telegram Bot API.
pub struct TelegramPublisher {
    client: reqwest::Client,
    api_base: String,
    token: String,
    channel: ChannelTarget,
    admin_id: Option<i64>,
    resolved_chat: OnceCell<i64>,
}

impl TelegramPublisher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(API_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: TELEGRAM_API_BASE.to_string(),
            token: config.bot_token.clone(),
            channel: config.channel.clone(),
            admin_id: config.admin_id,
            resolved_chat: OnceCell::new(),
        })
    }

    /// Numeric chat id of the target channel, resolving a handle on first
    /// use. Resolution failures are not cached, so the next publish
    /// attempt retries.
    async fn chat_id(&self) -> Result<i64> {
        match &self.channel {
            ChannelTarget::Id(id) => Ok(*id),
            ChannelTarget::Handle(handle) => self
                .resolved_chat
                .get_or_try_init(|| async {
                    let chat: ChatInfo = self
                        .call("getChat", &json!({"chat_id": format!("@{handle}")}))
                        .await?;
                    info!("resolved channel @{handle} to chat id {}", chat.id);
                    Ok(chat.id)
                })
                .await
                .copied(),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, payload: &Value) -> Result<T> {
        let url = format!("{}/bot{}/{}", self.api_base, self.token, method);

        // Strip the URL from transport errors so the token never reaches
        // the logs.
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::publish_api(format!("{method} request failed: {}", e.without_url())))?;

        let envelope: ApiEnvelope<T> = response.json().await.map_err(|e| {
            AppError::publish_api(format!(
                "{method} returned an unreadable response: {}",
                e.without_url()
            ))
        })?;

        if envelope.ok {
            envelope.result.ok_or_else(|| {
                AppError::publish_api(format!("{method} succeeded without a result payload"))
            })
        } else {
            Err(error_from_envelope(
                method,
                envelope.error_code,
                envelope.description,
            ))
        }
    }
}

#[async_trait]
impl Publisher for TelegramPublisher {
    async fn send_photo(&self, image_url: &str, caption: &str) -> Result<()> {
        let chat_id = self.chat_id().await?;
        let payload = json!({
            "chat_id": chat_id,
            "photo": image_url,
            "caption": caption,
        });
        self.call::<Value>("sendPhoto", &payload).await?;
        info!("sent photo {image_url} to chat {chat_id}");
        Ok(())
    }

    async fn notify_admin(&self, text: &str) -> Result<()> {
        let Some(admin_id) = self.admin_id else {
            debug!("no administrator configured, dropping notification");
            return Ok(());
        };
        let payload = json!({"chat_id": admin_id, "text": text});
        self.call::<Value>("sendMessage", &payload).await?;
        Ok(())
    }
}

/// Map a failed API envelope onto the error taxonomy: 403 means the bot is
/// not allowed to post to the target chat, everything else is an API error.
fn error_from_envelope(
    method: &str,
    error_code: Option<i64>,
    description: Option<String>,
) -> AppError {
    let description = description.unwrap_or_else(|| "no description".to_string());
    match error_code {
        Some(403) => AppError::permission(description),
        Some(code) => AppError::publish_api(format!("{method} failed with code {code}: {description}")),
        None => AppError::publish_api(format!("{method} failed: {description}")),
    }
}
