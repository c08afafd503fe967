//! A single supervised client process and its side files.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::config::InstanceSpec;
use crate::launcher::LaunchError;

/// `<config_root>/.config-<name>.json`
pub fn payload_file_path(config_root: &Path, name: &str) -> PathBuf {
    config_root.join(format!(".config-{name}.json"))
}

/// `<config_root>/.log-<name>.log`
pub fn log_file_path(config_root: &Path, name: &str) -> PathBuf {
    config_root.join(format!(".log-{name}.log"))
}

/// A started client process.
///
/// Owns the child handle and the parent's copy of the log file. Both are
/// released by [`RunningInstance::stop`].
#[derive(Debug)]
pub struct RunningInstance {
    name: String,
    pid: Option<u32>,
    child: Child,
    log: Option<File>,
    payload_path: PathBuf,
    log_path: PathBuf,
}

impl RunningInstance {
    /// Write the side files for `name` and start its process.
    pub(crate) fn start(
        config_root: &Path,
        binary: &Path,
        name: &str,
        spec: &InstanceSpec,
    ) -> Result<Self, LaunchError> {
        let payload_path = payload_file_path(config_root, name);
        let log_path = log_file_path(config_root, name);

        fs::write(&payload_path, spec.config.as_bytes()).map_err(|source| {
            LaunchError::WritePayload {
                name: name.to_string(),
                path: payload_path.clone(),
                source,
            }
        })?;

        let log = File::create(&log_path).map_err(|source| LaunchError::CreateLog {
            name: name.to_string(),
            path: log_path.clone(),
            source,
        })?;

        let spawn_err = |source: io::Error| LaunchError::Spawn {
            name: name.to_string(),
            binary: binary.to_path_buf(),
            source,
        };

        let stdout = log.try_clone().map_err(spawn_err)?;
        let stderr = log.try_clone().map_err(spawn_err)?;

        let child = Command::new(binary)
            .arg("-c")
            .arg(&payload_path)
            .arg("-s")
            .arg(&spec.server)
            .arg("-p")
            .arg(spec.port.to_string())
            .arg("-l")
            .arg(spec.listen.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_err)?;

        Ok(Self {
            name: name.to_string(),
            pid: child.id(),
            child,
            log: Some(log),
            payload_path,
            log_path,
        })
    }

    /// Instance name from `config.yml`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// OS process id captured at spawn time.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Side file holding the opaque payload.
    pub fn payload_path(&self) -> &Path {
        &self.payload_path
    }

    /// Log file receiving the child's stdout and stderr.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Whether the log handle is still held open.
    pub fn log_open(&self) -> bool {
        self.log.is_some()
    }

    /// Kill the process, reap it and close the log.
    ///
    /// The log is closed even when killing fails. Safe to call more than
    /// once; later calls do nothing.
    pub async fn stop(&mut self) -> io::Result<()> {
        let result = match self.child.try_wait() {
            Ok(Some(status)) => {
                tracing::debug!(instance = %self.name, %status, "Client already exited");
                Ok(())
            }
            Ok(None) => self.child.kill().await,
            Err(e) => Err(e),
        };

        if self.log.take().is_some() {
            tracing::info!(instance = %self.name, pid = ?self.pid, "Stopped client");
        }
        result
    }
}
