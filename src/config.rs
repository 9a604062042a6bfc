// src/config.rs

//! Environment-sourced service configuration.
//!
//! All settings come from environment variables (a `.env` file is honored
//! for local development). Required variables fail fast at startup with a
//! clear error; optional ones fall back to defaults.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::info;

use crate::error::{AppError, Result};

/// Default search page scraped every cycle.
pub const DEFAULT_SEARCH_URL: &str =
    "https://www.pinterest.com/search/pins/?q=toned%20women%20beach%20style&rs=typed";

const DEFAULT_PUBLISH_DELAY_MINUTES: u64 = 20;
const DEFAULT_PORT: u16 = 10000;
const DEFAULT_DATABASE_PATH: &str = "bot_data.db";

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot credential token
    pub bot_token: String,

    /// Target channel: numeric chat id or @handle
    pub channel: ChannelTarget,

    /// Telegram user id notified on permission failures
    pub admin_id: Option<i64>,

    /// Minutes between publish cycles
    pub publish_delay_minutes: u64,

    /// Search page scraped for candidates
    pub search_url: String,

    /// Listen port for the health endpoints
    pub port: u16,

    /// SQLite file backing the seen-set
    pub database_path: String,

    /// Public base URL of this service, for the keep-alive self-ping
    pub service_url: Option<String>,
}

/// Publish target as configured: either a resolved numeric chat id or a
/// human-readable handle that still needs resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelTarget {
    Id(i64),
    Handle(String),
}

impl ChannelTarget {
    /// Parse a raw `CHANNEL_ID` value. Pure numbers (including negative
    /// supergroup ids) become `Id`; anything else is treated as a handle
    /// with any leading `@` stripped.
    pub fn parse(raw: &str) -> Self {
        let compact: String = raw.trim().replace(' ', "");
        match compact.parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Handle(compact.trim_start_matches('@').to_string()),
        }
    }
}

impl fmt::Display for ChannelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelTarget::Id(id) => write!(f, "{id}"),
            ChannelTarget::Handle(handle) => write!(f, "@{handle}"),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = required(&lookup, "BOT_TOKEN")?;
        let channel = ChannelTarget::parse(&required(&lookup, "CHANNEL_ID")?);

        // A non-numeric ADMIN_ID is ignored rather than fatal.
        let admin_id = lookup("ADMIN_ID").and_then(|raw| raw.trim().parse().ok());

        Ok(Self {
            bot_token,
            channel,
            admin_id,
            publish_delay_minutes: parsed_or(
                &lookup,
                "PUBLISH_DELAY_MINUTES",
                DEFAULT_PUBLISH_DELAY_MINUTES,
            )?,
            search_url: lookup("PINTEREST_SEARCH_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            port: parsed_or(&lookup, "PORT", DEFAULT_PORT)?,
            database_path: lookup("DATABASE_PATH")
                .filter(|path| !path.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            service_url: lookup("SERVICE_URL").filter(|url| !url.trim().is_empty()),
        })
    }

    /// Interval between publish cycles.
    pub fn publish_interval(&self) -> Duration {
        Duration::from_secs(self.publish_delay_minutes * 60)
    }

    /// Log the effective configuration with the token masked.
    pub fn log_summary(&self) {
        info!("bot token            : {}", masked(&self.bot_token));
        info!("channel              : {}", self.channel);
        info!(
            "admin id             : {}",
            self.admin_id
                .map_or_else(|| "not set".to_string(), |id| id.to_string())
        );
        info!("publish delay (min)  : {}", self.publish_delay_minutes);
        info!("search url           : {}", self.search_url);
        info!("port                 : {}", self.port);
        info!("database path        : {}", self.database_path);
        info!(
            "service url          : {}",
            self.service_url.as_deref().unwrap_or("not set")
        );
    }
}

/// Mask a secret down to its last 6 characters.
fn masked(secret: &str) -> String {
    if secret.len() <= 6 {
        "*".repeat(secret.len())
    } else {
        let visible = &secret[secret.len() - 6..];
        format!("{}{}", "*".repeat(secret.len() - 6), visible)
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(AppError::config(format!(
            "{name} is not set in the environment"
        ))),
    }
}

fn parsed_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T> {
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| {
            AppError::config(format!("{name} must be a number, got {raw:?}"))
        }),
        _ => Ok(default),
    }
}
