// src/scheduler.rs

//! Periodic task loops: the publish cycle and the keep-alive self-ping.
//!
//! Both loops run as plain tokio tasks on the shared runtime; the health
//! server stays responsive while a cycle is suspended on network I/O.

use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::pipeline::PublishPipeline;
use crate::services::{Fetch, Publisher};

/// Delay before the first publish cycle after startup.
const FIRST_CYCLE_DELAY: Duration = Duration::from_secs(10);

/// Delay before the first keep-alive ping.
const FIRST_PING_DELAY: Duration = Duration::from_secs(30);
const PING_INTERVAL: Duration = Duration::from_secs(3 * 60);
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Run publish cycles forever on a fixed cadence.
///
/// Cycles are serialized inside this task. A tick that would fire while a
/// cycle is still running is skipped, not queued: at most one post per
/// interval, even after a stall.
pub async fn run_publish_loop<F, P>(pipeline: PublishPipeline<F, P>, period: Duration)
where
    F: Fetch + 'static,
    P: Publisher + 'static,
{
    info!(
        "publish scheduler started (every {} min)",
        period.as_secs() / 60
    );

    let mut ticker = interval_at(Instant::now() + FIRST_CYCLE_DELAY, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        match pipeline.run_cycle().await {
            Ok(outcome) => info!("publish cycle finished: {outcome}"),
            Err(error) => error!("publish cycle failed: {error}"),
        }
    }
}

/// Ping our own health endpoint so the hosting platform keeps the service
/// warm.
pub async fn run_keepalive(service_url: String) {
    let client = match reqwest::Client::builder().timeout(PING_TIMEOUT).build() {
        Ok(client) => client,
        Err(error) => {
            error!("keep-alive client build failed: {error}");
            return;
        }
    };

    let target = format!("{}/health", service_url.trim_end_matches('/'));
    let mut ticker = interval_at(Instant::now() + FIRST_PING_DELAY, PING_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        match client.get(&target).send().await {
            Ok(response) => debug!("keep-alive ping sent ({})", response.status()),
            Err(error) => warn!("keep-alive ping failed: {error}"),
        }
    }
}
