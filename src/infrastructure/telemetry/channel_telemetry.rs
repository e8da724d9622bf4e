//! Bounded-queue telemetry sink and the background shipper that drains it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use metrics::counter;
use reqwest::{Client, StatusCode};
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, info, warn};

use super::service::{LogEntry, TelemetrySink, TelemetryStatus};
use crate::error::AppError;

/// Attempts per entry, the first one included.
const SHIP_ATTEMPTS: usize = 3;

/// Sink that pushes entries onto a bounded channel.
///
/// A full queue drops the entry and bumps `telemetry_dropped_total`;
/// the caller is never blocked.
pub struct ChannelTelemetry {
    origin: String,
    tx: Sender<LogEntry>,
    capacity: usize,
    dropped: AtomicU64,
}

impl ChannelTelemetry {
    /// Creates the sink and the receiving half for a [`TelemetryShipper`].
    pub fn new(origin: impl Into<String>, capacity: usize) -> (Self, Receiver<LogEntry>) {
        let (tx, rx) = mpsc::channel(capacity);
        let sink = Self {
            origin: origin.into(),
            tx,
            capacity,
            dropped: AtomicU64::new(0),
        };
        (sink, rx)
    }
}

impl TelemetrySink for ChannelTelemetry {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn enqueue(&self, entry: LogEntry) {
        match self.tx.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                counter!("telemetry_dropped_total").increment(1);
            }
        }
    }

    fn status(&self) -> TelemetryStatus {
        TelemetryStatus {
            enabled: true,
            queued: self.capacity - self.tx.capacity(),
            capacity: self.capacity,
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ShipError {
    #[error("transient delivery failure: {0}")]
    Transient(String),
    #[error("collector rejected entry with {0}")]
    Rejected(StatusCode),
}

impl ShipError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Background task POSTing queued entries to the log collector.
///
/// Transport errors, 429 and 5xx replies are retried with exponential
/// backoff; other rejections are logged and the entry is dropped.
pub struct TelemetryShipper {
    client: Client,
    endpoint: String,
    token: Option<String>,
    rx: Receiver<LogEntry>,
}

impl TelemetryShipper {
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
        rx: Receiver<LogEntry>,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token,
            rx,
        })
    }

    /// Drains the queue until every sender is dropped.
    pub async fn run(mut self) {
        info!(endpoint = %self.endpoint, "Telemetry shipper started");

        while let Some(entry) = self.rx.recv().await {
            let strategy = ExponentialBackoff::from_millis(2)
                .factor(50)
                .max_delay(Duration::from_secs(2))
                .take(SHIP_ATTEMPTS - 1);

            let result =
                RetryIf::spawn(strategy, || self.post(&entry), ShipError::is_transient).await;

            if let Err(e) = result {
                warn!(component = %entry.component, error = %e, "Dropping telemetry entry");
            }
        }

        debug!("Telemetry shipper stopped");
    }

    async fn post(&self, entry: &LogEntry) -> Result<(), ShipError> {
        let mut request = self.client.post(&self.endpoint).json(entry);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ShipError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(ShipError::Transient(format!("collector returned {status}")))
        } else {
            Err(ShipError::Rejected(status))
        }
    }
}
