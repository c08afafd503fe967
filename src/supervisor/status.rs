//! Lock-free view of the supervisor state for observers.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::supervisor::generation::GenerationSnapshot;

/// Where the supervisor loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Stopped,
    Running,
    Reloading,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SupervisorState::Stopped => "stopped",
            SupervisorState::Running => "running",
            SupervisorState::Reloading => "reloading",
        };
        f.write_str(s)
    }
}

/// State plus the live generation, if any.
#[derive(Debug, Clone)]
pub struct Status {
    pub state: SupervisorState,
    pub generation: Option<GenerationSnapshot>,
}

impl Status {
    fn stopped() -> Self {
        Self {
            state: SupervisorState::Stopped,
            generation: None,
        }
    }
}

/// Shared handle to the latest published [`Status`].
///
/// Only the supervisor loop publishes; readers never block it.
#[derive(Debug, Clone)]
pub struct StatusHandle {
    inner: Arc<ArcSwap<Status>>,
}

impl Default for StatusHandle {
    fn default() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(Status::stopped())),
        }
    }
}

impl StatusHandle {
    /// Latest published status.
    pub fn load(&self) -> Arc<Status> {
        self.inner.load_full()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SupervisorState {
        self.inner.load().state
    }

    /// Snapshot of the live generation.
    pub fn generation(&self) -> Option<GenerationSnapshot> {
        self.inner.load().generation.clone()
    }

    pub(crate) fn publish(&self, state: SupervisorState, generation: Option<GenerationSnapshot>) {
        tracing::debug!(%state, generation = ?generation.as_ref().map(|g| g.generation), "State change");
        self.inner.store(Arc::new(Status { state, generation }));
    }

    /// Keep the published generation, change only the state.
    pub(crate) fn set_state(&self, state: SupervisorState) {
        let generation = self.inner.load().generation.clone();
        self.publish(state, generation);
    }
}
