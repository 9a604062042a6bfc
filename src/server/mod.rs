// src/server/mod.rs

//! Health surface consumed by the keep-alive pinger and platform checks.
//!
//! Two read-only endpoints: `/` answers with a liveness string, `/health`
//! with a small status payload backed by a database probe.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::context::AppContext;

const DB_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database: DatabaseHealth,
    published_total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_published_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct DatabaseHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Build the health router.
pub fn router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .with_state(context)
}

async fn root_handler() -> &'static str {
    "repin is running"
}

/// Health check endpoint.
///
/// Returns 200 when the seen-set database answers a probe within the
/// timeout, 503 otherwise.
async fn health_handler(
    State(context): State<Arc<AppContext>>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = match tokio::time::timeout(DB_PROBE_TIMEOUT, context.store.ping()).await {
        Ok(Ok(())) => DatabaseHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(error)) => DatabaseHealth {
            status: "error".to_string(),
            error: Some(error.to_string()),
        },
        Err(_) => DatabaseHealth {
            status: "error".to_string(),
            error: Some(format!("probe timeout (>{}s)", DB_PROBE_TIMEOUT.as_secs())),
        },
    };

    let healthy = database.status == "ok";
    let (published_total, last_published_at) = if healthy {
        let total = context.store.published_count().await.unwrap_or(0);
        let last = context
            .store
            .last_published()
            .await
            .ok()
            .flatten()
            .map(|record| record.published_at);
        (total, last)
    } else {
        (0, None)
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            database,
            published_total,
            last_published_at,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    use crate::config::{ChannelTarget, Config};
    use crate::storage::SeenStore;

    async fn test_context(dir: &tempfile::TempDir) -> Arc<AppContext> {
        let path = dir.path().join("seen.db");
        let store = SeenStore::connect(path.to_str().unwrap()).await.unwrap();
        store.migrate().await.unwrap();

        let config = Config {
            bot_token: "123456:ABCDEF".to_string(),
            channel: ChannelTarget::Handle("channel".to_string()),
            admin_id: None,
            publish_delay_minutes: 20,
            search_url: "https://pins.example/search".to_string(),
            port: 10000,
            database_path: path.to_str().unwrap().to_string(),
            service_url: None,
        };

        Arc::new(AppContext { config, store })
    }

    #[tokio::test]
    async fn test_root_liveness_string() {
        assert_eq!(root_handler().await, "repin is running");
    }

    #[tokio::test]
    async fn test_health_reports_ok_with_live_database() {
        let dir = tempdir().unwrap();
        let context = test_context(&dir).await;
        context.store.mark_published("abc").await.unwrap();

        let (status, Json(payload)) = health_handler(State(context)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ok");
        assert_eq!(payload.database.status, "ok");
        assert_eq!(payload.published_total, 1);
        assert!(payload.last_published_at.is_some());
    }

    #[tokio::test]
    async fn test_health_payload_serializes() {
        let dir = tempdir().unwrap();
        let context = test_context(&dir).await;

        let (_, Json(payload)) = health_handler(State(context)).await;
        let encoded = serde_json::to_value(&payload).unwrap();

        assert_eq!(encoded["status"], "ok");
        assert_eq!(encoded["published_total"], 0);
        // No publication yet: the optional timestamp is omitted entirely.
        assert!(encoded.get("last_published_at").is_none());
    }
}
