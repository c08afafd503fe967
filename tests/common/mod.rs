//! Shared utilities for supervisor integration tests.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ck_supervisor::bootstrap::FixedBinary;
use ck_supervisor::lifecycle::Shutdown;
use ck_supervisor::supervisor::{StatusHandle, Supervisor, SupervisorError};
use ck_supervisor::SupervisorSettings;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Stand-in for `ck-client`.
///
/// Appends to `<bin dir>/events`:
/// - `seen <own pid> <pid>` for every earlier client still alive at start
/// - `start <own pid> <args...>`
///
/// then writes one line to stdout and one to stderr and sleeps.
const SENTINEL: &str = r#"#!/bin/sh
dir="$(dirname "$0")"
for pid in $(cat "$dir/live" 2>/dev/null); do
  if kill -0 "$pid" 2>/dev/null; then
    echo "seen $$ $pid" >> "$dir/events"
  fi
done
echo "$$" >> "$dir/live"
echo "start $$ $*" >> "$dir/events"
echo "client output for $4"
echo "client error for $4" >&2
exec sleep 60
"#;

/// Temp directories plus a sentinel client binary.
pub struct Harness {
    pub config_root: TempDir,
    pub bin_dir: TempDir,
    pub binary: PathBuf,
}

impl Harness {
    pub fn new() -> Self {
        let config_root = TempDir::new().unwrap();
        let bin_dir = TempDir::new().unwrap();
        let binary = bin_dir.path().join("ck-client");
        fs::write(&binary, SENTINEL).unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();

        Self {
            config_root,
            bin_dir,
            binary,
        }
    }

    pub fn root(&self) -> &Path {
        self.config_root.path()
    }

    pub fn settings(&self, settle_ms: u64, grace_ms: u64) -> SupervisorSettings {
        SupervisorSettings {
            config_root: self.root().to_path_buf(),
            binary: Some(self.binary.clone()),
            settle_ms,
            grace_ms,
            metrics_address: None,
        }
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.root().join("config.yml"), content).unwrap();
    }

    /// Lines the sentinel appended so far.
    pub fn events(&self) -> Vec<String> {
        fs::read_to_string(self.bin_dir.path().join("events"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Spawn a supervisor with short reload timings.
    pub fn spawn(&self, settle_ms: u64, grace_ms: u64) -> Running {
        let supervisor = Supervisor::new(
            self.settings(settle_ms, grace_ms),
            FixedBinary::new(&self.binary),
        );
        let status = supervisor.status();
        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        let task = tokio::spawn(supervisor.run(receiver));

        Running {
            status,
            shutdown,
            task,
        }
    }
}

/// A supervisor running on a background task.
pub struct Running {
    pub status: StatusHandle,
    pub shutdown: Shutdown,
    pub task: JoinHandle<Result<(), SupervisorError>>,
}

impl Running {
    pub async fn wait_for_generation(&self, generation: u64) {
        let status = self.status.clone();
        wait_until(Duration::from_secs(10), move || {
            status.generation().map(|g| g.generation) == Some(generation)
        })
        .await;
    }

    pub async fn stop(self) -> Result<(), SupervisorError> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("supervisor did not stop")
            .expect("supervisor task panicked")
    }
}

/// Poll `condition` until it holds or `timeout` expires.
pub async fn wait_until<F>(timeout: Duration, condition: F)
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within {timeout:?}"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

pub fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

pub fn one_client(name: &str, server: &str, listen: u16) -> String {
    format!(
        "clients:\n  {name}:\n    server: {server}\n    port: 443\n    listen: {listen}\n    config: payload\n"
    )
}
