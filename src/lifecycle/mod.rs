//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Settings → Metrics (optional) → Signal listener → Supervisor::run
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → supervisor stops every client → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup or reload error is fatal to the process
//! - Children are always stopped before the process exits
//! - Reloads come from the file watcher, not from signals

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
