//! Metrics collection and exposition.
//!
//! # Metrics
//! - `supervisor_reloads_total` (counter): reload cycles by `outcome`
//! - `supervisor_instances_running` (gauge): instances in the live generation
//! - `supervisor_generation` (gauge): number of the live generation
//! - `supervisor_instance_launches_total` (counter): child processes started
//! - `supervisor_watch_errors_total` (counter): errors from the file watcher

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Outcome label for a reload cycle.
#[derive(Debug, Clone, Copy)]
pub enum ReloadOutcome {
    Ok,
    Error,
}

impl ReloadOutcome {
    fn as_str(self) -> &'static str {
        match self {
            ReloadOutcome::Ok => "ok",
            ReloadOutcome::Error => "error",
        }
    }
}

pub fn record_reload(outcome: ReloadOutcome) {
    metrics::counter!("supervisor_reloads_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_generation(generation: u64, instances: usize) {
    metrics::gauge!("supervisor_generation").set(generation as f64);
    metrics::gauge!("supervisor_instances_running").set(instances as f64);
}

pub fn record_stopped() {
    metrics::gauge!("supervisor_instances_running").set(0.0);
}

pub fn record_instance_launch() {
    metrics::counter!("supervisor_instance_launches_total").increment(1);
}

pub fn record_watch_error() {
    metrics::counter!("supervisor_watch_errors_total").increment(1);
}
