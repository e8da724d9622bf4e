//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, telemetry setup, and Axum server lifecycle.

use crate::config::{Config, StoreBackend};
use crate::domain::repositories::{DraftRepository, LinkRepository};
use crate::infrastructure::persistence::{
    FileLinkRepository, MemoryLinkRepository, RemoteLinkRepository,
};
use crate::infrastructure::telemetry::{
    ChannelTelemetry, NullTelemetry, TelemetryShipper, TelemetrySink,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Builds the record and draft stores selected by `STORE_BACKEND`.
///
/// The remote backend has no draft endpoint, so drafts then stay in memory.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or the HTTP
/// client cannot be built.
pub async fn build_stores(
    config: &Config,
) -> Result<(Arc<dyn LinkRepository>, Arc<dyn DraftRepository>)> {
    match config.store_backend {
        StoreBackend::Memory => {
            let store = Arc::new(MemoryLinkRepository::new());
            let links: Arc<dyn LinkRepository> = store.clone();
            let drafts: Arc<dyn DraftRepository> = store;
            Ok((links, drafts))
        }
        StoreBackend::File => {
            let store = Arc::new(FileLinkRepository::open(&config.store_path).await?);
            let links: Arc<dyn LinkRepository> = store.clone();
            let drafts: Arc<dyn DraftRepository> = store;
            Ok((links, drafts))
        }
        StoreBackend::Remote => {
            let base_url = config
                .backend_url
                .clone()
                .context("BACKEND_URL must be set for the remote store")?;
            let links: Arc<dyn LinkRepository> = Arc::new(RemoteLinkRepository::new(
                base_url,
                config.backend_token.clone(),
                Duration::from_secs(config.backend_timeout_seconds),
            )?);
            tracing::info!("Drafts kept in memory (remote backend has no draft storage)");
            let drafts: Arc<dyn DraftRepository> = Arc::new(MemoryLinkRepository::new());
            Ok((links, drafts))
        }
    }
}

/// Builds the telemetry sink and spawns its shipper when a collector is set.
///
/// # Errors
///
/// Returns an error if the shipper's HTTP client cannot be built.
pub fn build_telemetry(config: &Config) -> Result<(Arc<dyn TelemetrySink>, Option<JoinHandle<()>>)> {
    let Some(url) = &config.telemetry_url else {
        tracing::info!("Telemetry disabled (NullTelemetry)");
        let sink: Arc<dyn TelemetrySink> = Arc::new(NullTelemetry::new(&config.telemetry_origin));
        return Ok((sink, None));
    };

    let (sink, rx) = ChannelTelemetry::new(&config.telemetry_origin, config.telemetry_queue_capacity);
    let shipper = TelemetryShipper::new(
        url.clone(),
        config.telemetry_token.clone(),
        Duration::from_secs(config.backend_timeout_seconds),
        rx,
    )?;
    let handle = tokio::spawn(shipper.run());
    tracing::info!("Telemetry shipper spawned");

    let sink: Arc<dyn TelemetrySink> = Arc::new(sink);
    Ok((sink, Some(handle)))
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Record and draft stores
/// - Telemetry sink and background shipper
/// - Axum HTTP server with graceful shutdown on Ctrl+C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Store initialization fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (links, drafts) = build_stores(&config).await?;
    tracing::info!(backend = links.backend_name(), "Record store ready");

    let (telemetry, shipper) = build_telemetry(&config)?;

    let state = AppState::new(
        links,
        drafts,
        telemetry,
        config.base_url.clone(),
        config.default_validity_minutes,
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router (and with it the last telemetry sender) is gone; let the
    // shipper flush what is queued.
    if let Some(handle) = shipper {
        match tokio::time::timeout(Duration::from_secs(5), handle).await {
            Ok(_) => tracing::info!("Telemetry flushed"),
            Err(_) => tracing::warn!("Telemetry flush timed out, dropping queued entries"),
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
