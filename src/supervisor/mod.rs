//! Supervisor loop subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     bootstrap → create config root → register watch
//!     → load config → launch → Generation #1 (RUNNING)
//!
//! On config change (RELOADING):
//!     settle delay → drop coalesced events → cancel generation
//!     → await teardown → grace period → load → launch → Generation #n+1
//!
//! On shutdown signal:
//!     cancel generation → await teardown → STOPPED
//! ```
//!
//! # Design Decisions
//! - The loop owns the only live [`Generation`] and swaps it on reload
//! - Reload steps are strictly serialized; launches never overlap
//! - Load or launch failure ends the loop (fail fast, no fallback)
//! - Watch errors while running are logged and ignored

pub mod control;
pub mod generation;
pub mod status;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::config::ConfigError;
use crate::launcher::LaunchError;

pub use control::Supervisor;
pub use generation::{Generation, GenerationSnapshot, InstanceSnapshot};
pub use status::{Status, StatusHandle, SupervisorState};

/// Fatal errors that end the supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("launch failed: {0}")]
    Launch(#[from] LaunchError),

    #[error("failed to watch configuration: {0}")]
    Watch(#[from] notify::Error),

    #[error("configuration watcher stopped unexpectedly")]
    WatchClosed,

    #[error("failed to create config root {path}: {source}")]
    ConfigRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
