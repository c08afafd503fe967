//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! <config-root>/config.yml (YAML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → SupervisorConfig (validated, immutable)
//!     → consumed once by the launcher, then dropped
//!
//! On file change:
//!     watcher.rs forwards the raw event to the supervisor loop
//!     → loop debounces, tears down the running generation
//!     → loader.rs re-reads the file from disk
//! ```
//!
//! # Design Decisions
//! - Config is never cached; every (re)start reads the file again
//! - Loading fails closed: an error never carries a partial config
//! - Validation separates syntactic (serde) from semantic checks
//! - Runtime settings (paths, delays) live in `settings.rs`, apart from
//!   the watched client file

pub mod loader;
pub mod schema;
pub mod settings;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{InstanceSpec, SupervisorConfig};
pub use settings::SupervisorSettings;
pub use watcher::{ConfigEvent, ConfigWatcher};
