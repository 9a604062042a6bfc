// src/main.rs

//! Service entry point.
//!
//! Wires configuration, the seen-set store, the publish scheduler, and the
//! health server together, then serves until an interrupt or termination
//! signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use log::info;

use repin::config::Config;
use repin::context::AppContext;
use repin::error::Result;
use repin::pipeline::PublishPipeline;
use repin::scheduler;
use repin::server;
use repin::services::{PageFetcher, TelegramPublisher};
use repin::storage::SeenStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Required settings missing here end the process before anything runs.
    let config = Config::from_env()?;
    config.log_summary();

    let store = SeenStore::connect(&config.database_path).await?;
    store.migrate().await?;

    let fetcher = PageFetcher::new()?;
    let publisher = TelegramPublisher::new(&config)?;
    let pipeline = PublishPipeline::new(
        fetcher,
        publisher,
        store.clone(),
        config.search_url.clone(),
    );

    let publish_task = tokio::spawn(scheduler::run_publish_loop(
        pipeline,
        config.publish_interval(),
    ));
    let keepalive_task = config
        .service_url
        .clone()
        .map(|url| tokio::spawn(scheduler::run_keepalive(url)));

    let context = Arc::new(AppContext { config, store });
    let addr = SocketAddr::from(([0, 0, 0, 0], context.config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("health server listening on {addr}");

    axum::serve(listener, server::router(Arc::clone(&context)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the schedulers without waiting for in-flight jobs; dropping the
    // clients closes their outbound sessions.
    publish_task.abort();
    if let Some(task) = keepalive_task {
        task.abort();
    }

    info!("shutdown complete");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
