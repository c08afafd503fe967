//! One generation of running instances and its teardown task.

use std::path::PathBuf;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::launcher::ProcessSet;

/// Read-only view of a generation, published for observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSnapshot {
    pub generation: u64,
    pub instances: Vec<InstanceSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSnapshot {
    pub name: String,
    pub pid: Option<u32>,
    pub payload_path: PathBuf,
    pub log_path: PathBuf,
}

impl GenerationSnapshot {
    fn capture(generation: u64, set: &ProcessSet) -> Self {
        Self {
            generation,
            instances: set
                .iter()
                .map(|i| InstanceSnapshot {
                    name: i.name().to_string(),
                    pid: i.pid(),
                    payload_path: i.payload_path().to_path_buf(),
                    log_path: i.log_path().to_path_buf(),
                })
                .collect(),
        }
    }

    /// Pid of the instance called `name`, if it is part of this generation.
    pub fn pid_of(&self, name: &str) -> Option<u32> {
        self.instances
            .iter()
            .find(|i| i.name == name)
            .and_then(|i| i.pid)
    }
}

/// A live [`ProcessSet`] bound to its cancellation token.
///
/// The set is moved into a background task that waits for the token and
/// then tears every instance down. Cancelling is idempotent and the task
/// runs at most once; dropping the generation also cancels it.
#[derive(Debug)]
pub struct Generation {
    number: u64,
    token: CancellationToken,
    snapshot: GenerationSnapshot,
    teardown: Option<JoinHandle<usize>>,
}

impl Generation {
    /// Take ownership of `set` and spawn its teardown task.
    pub fn start(number: u64, mut set: ProcessSet) -> Self {
        let token = CancellationToken::new();
        let snapshot = GenerationSnapshot::capture(number, &set);

        let cancelled = token.clone();
        let teardown = tokio::spawn(async move {
            cancelled.cancelled().await;
            tracing::info!(generation = number, "Tearing down generation");
            set.teardown().await
        });

        Self {
            number,
            token,
            snapshot,
            teardown: Some(teardown),
        }
    }

    /// Generation number, starting at 1.
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Instances this generation started.
    pub fn snapshot(&self) -> &GenerationSnapshot {
        &self.snapshot
    }

    /// A clone of the generation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Signal teardown without waiting for it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancel and wait until every instance is stopped.
    ///
    /// Returns the number of instances stopped; later calls return 0.
    pub async fn shutdown(&mut self) -> usize {
        self.token.cancel();

        let Some(handle) = self.teardown.take() else {
            return 0;
        };

        match handle.await {
            Ok(stopped) => {
                tracing::info!(generation = self.number, stopped, "Generation stopped");
                stopped
            }
            Err(e) => {
                tracing::error!(generation = self.number, error = %e, "Teardown task failed");
                0
            }
        }
    }
}

impl Drop for Generation {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
