//! Instance launcher subsystem.
//!
//! # Data Flow
//! ```text
//! SupervisorConfig (one generation)
//!     → instance.rs (side files + one child process per client)
//!     → process_set.rs (ProcessSet owning every RunningInstance)
//!     → handed to the supervisor's Generation for teardown
//! ```
//!
//! # Design Decisions
//! - Launch is atomic: a failure part way through stops every instance
//!   already started in the same attempt before the error is returned
//! - Side files are overwritten in place; names derive only from the
//!   instance name
//! - Children are spawned with `kill_on_drop` so a dropped set never
//!   leaves orphans behind

pub mod instance;
pub mod process_set;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::SupervisorConfig;
use crate::observability::metrics;

pub use instance::{log_file_path, payload_file_path, RunningInstance};
pub use process_set::ProcessSet;

/// Errors raised while starting a generation.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("instance {name}: failed to write payload {path}: {source}")]
    WritePayload {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("instance {name}: failed to create log {path}: {source}")]
    CreateLog {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("instance {name}: failed to start {binary}: {source}")]
    Spawn {
        name: String,
        binary: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Start one `binary` process per configured client.
///
/// Instances start in name order. On error, instances already started by
/// this call are stopped and their logs closed before returning.
pub async fn launch(
    config_root: &Path,
    binary: &Path,
    config: &SupervisorConfig,
) -> Result<ProcessSet, LaunchError> {
    let mut set = ProcessSet::with_capacity(config.len());

    for (name, spec) in &config.clients {
        match RunningInstance::start(config_root, binary, name, spec) {
            Ok(instance) => {
                tracing::info!(
                    instance = %name,
                    pid = ?instance.pid(),
                    payload = %instance.payload_path().display(),
                    "Started client"
                );
                metrics::record_instance_launch();
                set.push(instance);
            }
            Err(e) => {
                tracing::error!(instance = %name, error = %e, "Launch failed, stopping partial set");
                let stopped = set.teardown().await;
                tracing::debug!(stopped, "Partial launch rolled back");
                return Err(e);
            }
        }
    }

    Ok(set)
}
