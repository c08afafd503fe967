//! The supervisor control loop.

use std::path::Path;
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};

use crate::bootstrap::BinaryProvider;
use crate::config::{load_config, ConfigEvent, ConfigWatcher, SupervisorSettings};
use crate::launcher;
use crate::observability::metrics::{self, ReloadOutcome};
use crate::supervisor::generation::Generation;
use crate::supervisor::status::{StatusHandle, SupervisorState};
use crate::supervisor::SupervisorError;

/// Runs one generation of clients at a time and restarts them all whenever
/// `config.yml` changes.
pub struct Supervisor<B> {
    settings: SupervisorSettings,
    provider: B,
    status: StatusHandle,
}

impl<B: BinaryProvider> Supervisor<B> {
    /// Create a supervisor; nothing runs until [`Supervisor::run`].
    pub fn new(settings: SupervisorSettings, provider: B) -> Self {
        Self {
            settings,
            provider,
            status: StatusHandle::default(),
        }
    }

    /// Handle for observing state and the live generation.
    pub fn status(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Run until `shutdown` fires or a fatal error occurs.
    ///
    /// Every child is stopped before this returns, on both paths.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), SupervisorError> {
        let binary = self.provider.ensure_binary_present().await?;

        let config_root = &self.settings.config_root;
        tokio::fs::create_dir_all(config_root)
            .await
            .map_err(|source| SupervisorError::ConfigRoot {
                path: config_root.clone(),
                source,
            })?;

        let config_file = self.settings.config_file();
        let (watcher, mut events) = ConfigWatcher::new(&config_file);
        let _watcher = watcher.run()?;

        tracing::info!(
            config = %config_file.display(),
            binary = %binary.display(),
            "Supervisor starting"
        );

        let mut current = self.start_generation(1, &binary).await?;

        let result = self
            .supervise(&mut current, &mut events, &mut shutdown, &binary)
            .await;

        current.shutdown().await;
        self.status.publish(SupervisorState::Stopped, None);
        metrics::record_stopped();
        tracing::info!("Supervisor stopped");
        result
    }

    /// The RUNNING state: wait for a change or shutdown, reload on change.
    ///
    /// Returns `Ok` once shutdown is requested. The caller stops `current`.
    pub(crate) async fn supervise(
        &self,
        current: &mut Generation,
        events: &mut mpsc::UnboundedReceiver<ConfigEvent>,
        shutdown: &mut broadcast::Receiver<()>,
        binary: &Path,
    ) -> Result<(), SupervisorError> {
        loop {
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received");
                    return Ok(());
                }
                event = events.recv() => match event {
                    Some(ConfigEvent::Changed) => {
                        if let Reload::Stopped = self.reload(current, events, shutdown, binary).await? {
                            tracing::info!("Shutdown signal received during reload");
                            return Ok(());
                        }
                    }
                    Some(ConfigEvent::Error(e)) => log_watch_error(&e),
                    None => return Err(SupervisorError::WatchClosed),
                },
            }
        }
    }

    /// RUNNING → RELOADING → RUNNING.
    ///
    /// Shutdown interrupts the settle and grace waits, and is checked again
    /// right before launching, so no generation starts after a stop request.
    async fn reload(
        &self,
        current: &mut Generation,
        events: &mut mpsc::UnboundedReceiver<ConfigEvent>,
        shutdown: &mut broadcast::Receiver<()>,
        binary: &Path,
    ) -> Result<Reload, SupervisorError> {
        self.status.set_state(SupervisorState::Reloading);

        if sleep_or_shutdown(self.settings.settle_delay(), shutdown).await {
            return Ok(Reload::Stopped);
        }
        let coalesced = drain_events(events);
        tracing::info!(
            generation = current.number(),
            coalesced,
            "Configuration changed, restarting all clients"
        );

        current.shutdown().await;
        self.status.publish(SupervisorState::Reloading, None);

        if sleep_or_shutdown(self.settings.grace_period(), shutdown).await {
            return Ok(Reload::Stopped);
        }
        // The config is read after this point, so anything queued so far is
        // already reflected in the next generation.
        drain_events(events);

        if shutdown_pending(shutdown) {
            return Ok(Reload::Stopped);
        }

        match self.start_generation(current.number() + 1, binary).await {
            Ok(next) => {
                *current = next;
                metrics::record_reload(ReloadOutcome::Ok);
                Ok(Reload::Reloaded)
            }
            Err(e) => {
                tracing::error!(error = %e, "Reload failed, stopping supervisor");
                metrics::record_reload(ReloadOutcome::Error);
                Err(e)
            }
        }
    }

    async fn start_generation(&self, number: u64, binary: &Path) -> Result<Generation, SupervisorError> {
        let config = load_config(&self.settings.config_file())?;
        tracing::info!(generation = number, instances = config.len(), "Starting generation");

        let set = launcher::launch(&self.settings.config_root, binary, &config).await?;
        let generation = Generation::start(number, set);

        let snapshot = generation.snapshot().clone();
        metrics::record_generation(number, snapshot.instances.len());
        self.status.publish(SupervisorState::Running, Some(snapshot));
        Ok(generation)
    }
}

/// How a reload cycle ended.
enum Reload {
    Reloaded,
    Stopped,
}

/// Sleep for `delay`; returns `true` if shutdown fired first.
async fn sleep_or_shutdown(delay: Duration, shutdown: &mut broadcast::Receiver<()>) -> bool {
    tokio::select! {
        biased;

        _ = shutdown.recv() => true,
        _ = tokio::time::sleep(delay) => false,
    }
}

/// Whether a shutdown was sent (or the sender dropped) without waiting.
fn shutdown_pending(shutdown: &mut broadcast::Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}

/// Discard queued events, returning how many were changes.
fn drain_events(events: &mut mpsc::UnboundedReceiver<ConfigEvent>) -> usize {
    let mut changes = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            ConfigEvent::Changed => changes += 1,
            ConfigEvent::Error(e) => log_watch_error(&e),
        }
    }
    changes
}

fn log_watch_error(error: &notify::Error) {
    tracing::warn!(error = %error, "Config watch error");
    metrics::record_watch_error();
}
