//! Hot-reloading supervisor for `ck-client` instances.

pub mod bootstrap;
pub mod config;
pub mod launcher;
pub mod lifecycle;
pub mod observability;
pub mod supervisor;

pub use config::{SupervisorConfig, SupervisorSettings};
pub use lifecycle::Shutdown;
pub use supervisor::{Supervisor, SupervisorError};
