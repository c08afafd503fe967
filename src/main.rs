//! ck-supervisor
//!
//! Runs one `ck-client` process per entry in `~/.config/cloak/config.yml`
//! and restarts all of them whenever that file changes.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌───────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐
//!   │ bootstrap │──▶│ config       │──▶│ launcher     │──▶│ ck-client × N    │
//!   │ (binary)  │   │ loader       │   │ (side files) │   │ .log-<name>.log  │
//!   └───────────┘   └──────▲───────┘   └──────────────┘   └────────▲─────────┘
//!                          │                                       │ kill
//!                   ┌──────┴───────┐   ┌──────────────┐            │
//!   config.yml ───▶ │ config       │──▶│ supervisor   │────────────┘
//!     (edits)       │ watcher      │   │ loop         │  cancel generation
//!                   └──────────────┘   └──────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use ck_supervisor::config::settings::default_config_root;
use ck_supervisor::lifecycle::startup;
use ck_supervisor::observability::logging::{self, LogFormat};
use ck_supervisor::SupervisorSettings;

#[derive(Parser)]
#[command(name = "ck-supervisor")]
#[command(about = "Run and hot-reload ck-client instances from config.yml", long_about = None)]
struct Cli {
    /// Directory holding config.yml and the generated side files.
    #[arg(long, env = "CK_SUPERVISOR_CONFIG_ROOT")]
    config_root: Option<PathBuf>,

    /// Use this client binary instead of looking it up or installing it.
    #[arg(long, env = "CK_SUPERVISOR_BINARY")]
    binary: Option<PathBuf>,

    /// Debounce window after a config change, in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    settle_ms: u64,

    /// Delay between stopping and restarting clients, in milliseconds.
    #[arg(long, default_value_t = 2_000)]
    grace_ms: u64,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    metrics_address: Option<SocketAddr>,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Cli {
    fn into_settings(self) -> SupervisorSettings {
        SupervisorSettings {
            config_root: self.config_root.unwrap_or_else(default_config_root),
            binary: self.binary,
            settle_ms: self.settle_ms,
            grace_ms: self.grace_ms,
            metrics_address: self.metrics_address,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_format) {
        eprintln!("failed to initialize logging: {e}");
    }

    tracing::info!("ck-supervisor v{} starting", env!("CARGO_PKG_VERSION"));

    match startup::run(cli.into_settings()).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Supervisor failed");
            eprintln!("ck-supervisor: {e}");
            ExitCode::FAILURE
        }
    }
}
