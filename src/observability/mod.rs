//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config / launcher / supervisor produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`generation`, `instance`, `pid`) on every lifecycle event
//! - Metric updates are no-ops until an exporter is installed
//! - Child process output never flows through here; it goes to per-instance logs

pub mod logging;
pub mod metrics;
