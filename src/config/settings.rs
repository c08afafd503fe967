//! Runtime settings for the supervisor itself.
//!
//! These are distinct from `config.yml`: they are fixed for the lifetime of
//! the process and come from the command line or environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::loader::config_file_path;

/// Settings controlling the supervisor loop.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SupervisorSettings {
    /// Directory holding `config.yml` and the generated side files.
    pub config_root: PathBuf,

    /// Explicit client binary; skips lookup and installation when set.
    pub binary: Option<PathBuf>,

    /// Debounce window after a change event, in milliseconds.
    pub settle_ms: u64,

    /// Delay between teardown and relaunch, in milliseconds.
    pub grace_ms: u64,

    /// Prometheus exporter address. Metrics are disabled when unset.
    pub metrics_address: Option<SocketAddr>,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            config_root: default_config_root(),
            binary: None,
            settle_ms: 1_000,
            grace_ms: 2_000,
            metrics_address: None,
        }
    }
}

impl SupervisorSettings {
    /// Path of the watched `config.yml`.
    pub fn config_file(&self) -> PathBuf {
        config_file_path(&self.config_root)
    }

    /// Debounce window as a `Duration`.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Teardown-to-relaunch delay as a `Duration`.
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

/// `~/.config/cloak`, or a relative `.config/cloak` when no home is known.
pub fn default_config_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".config")
        .join("cloak")
}
