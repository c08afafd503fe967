//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the metrics exporter when configured
//! - Pick the binary provider (explicit path or lookup/install)
//! - Wire the signal listener to the supervisor's shutdown channel
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A metrics exporter failure is logged, not fatal

use crate::bootstrap::{BinaryProvider, FixedBinary, SystemBinary};
use crate::config::SupervisorSettings;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::supervisor::{Supervisor, SupervisorError};

/// Run the supervisor until a termination signal or a fatal error.
pub async fn run(settings: SupervisorSettings) -> Result<(), SupervisorError> {
    if let Some(addr) = settings.metrics_address {
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter");
        }
    }

    let shutdown = Shutdown::new();
    let listener = signals::spawn_listener(shutdown.clone());

    let result = match settings.binary.clone() {
        Some(path) => supervise(settings, FixedBinary::new(path), &shutdown).await,
        None => supervise(settings, SystemBinary::default(), &shutdown).await,
    };

    listener.abort();
    result
}

async fn supervise<B: BinaryProvider>(
    settings: SupervisorSettings,
    provider: B,
    shutdown: &Shutdown,
) -> Result<(), SupervisorError> {
    Supervisor::new(settings, provider)
        .run(shutdown.subscribe())
        .await
}
