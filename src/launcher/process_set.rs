//! The collection of instances started together for one generation.

use crate::launcher::instance::RunningInstance;

/// Every [`RunningInstance`] of one generation, in launch order.
#[derive(Debug, Default)]
pub struct ProcessSet {
    instances: Vec<RunningInstance>,
}

impl ProcessSet {
    /// Create an empty set sized for `capacity` instances.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, instance: RunningInstance) {
        self.instances.push(instance);
    }

    /// Number of instances still held.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether every instance has been stopped or none was started.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instances in launch order.
    pub fn iter(&self) -> impl Iterator<Item = &RunningInstance> {
        self.instances.iter()
    }

    /// Stop every instance and close every log.
    ///
    /// Instances are drained out of the set as they are stopped, so a second
    /// call finds nothing to do. Returns how many instances were stopped.
    pub async fn teardown(&mut self) -> usize {
        let mut stopped = 0;
        for mut instance in self.instances.drain(..) {
            if let Err(e) = instance.stop().await {
                tracing::warn!(
                    instance = %instance.name(),
                    pid = ?instance.pid(),
                    error = %e,
                    "Failed to kill client"
                );
            }
            stopped += 1;
        }
        stopped
    }
}
