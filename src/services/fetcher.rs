// src/services/fetcher.rs

//! Page fetcher with identity spoofing and bounded retry.
//!
//! The source serves materially different markup to bot-identified
//! clients, so every request carries a mobile-browser header set.

use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT};

use crate::error::{AppError, Result};

const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; K) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Mobile Safari/537.36";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";
const REFERER_VALUE: &str = "https://www.google.com/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_ATTEMPTS: u32 = 3;

/// Seam for fetching raw page content.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch a page, returning its raw body.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP page fetcher used in production.
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    /// Create a fetcher with the spoofed header set and request timeout.
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(MOBILE_USER_AGENT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
        );
        headers.insert(REFERER, HeaderValue::from_static(REFERER_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    async fn try_fetch(&self, url: &str) -> std::result::Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}

#[async_trait]
impl Fetch for PageFetcher {
    /// Fetch a page, retrying transport errors and non-2xx responses up to
    /// three attempts with exponential backoff (2 s, then 4 s).
    async fn fetch(&self, url: &str) -> Result<String> {
        let mut last_error = String::new();
        for attempt in 1..=MAX_ATTEMPTS {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(error) => {
                    warn!("attempt {attempt}/{MAX_ATTEMPTS} failed for {url}: {error}");
                    last_error = error.to_string();
                }
            }
            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(backoff_delay(attempt)).await;
            }
        }
        Err(AppError::fetch(url, last_error))
    }
}

/// Delay before the attempt following `attempt`: doubles each time.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt)
}
