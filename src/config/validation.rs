//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Instance names must be usable inside generated file names
//! - Validate value ranges (ports valid)
//! - Detect conflicting local listen ports
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SupervisorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is handed to the launcher

use std::collections::HashMap;

use thiserror::Error;

use crate::config::schema::SupervisorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("instance name must not be empty")]
    EmptyName,

    #[error("instance name {0:?} cannot be used in a file name")]
    InvalidName(String),

    #[error("instance {0:?}: server must not be empty")]
    EmptyServer(String),

    #[error("instance {name:?}: {field} must be between 1 and 65535")]
    ZeroPort { name: String, field: &'static str },

    #[error("instances {first:?} and {second:?} both listen on port {port}")]
    DuplicateListen {
        first: String,
        second: String,
        port: u16,
    },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SupervisorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut listeners: HashMap<u16, &str> = HashMap::new();

    for (name, spec) in &config.clients {
        if name.is_empty() {
            errors.push(ValidationError::EmptyName);
        } else if !is_safe_name(name) {
            errors.push(ValidationError::InvalidName(name.clone()));
        }

        if spec.server.trim().is_empty() {
            errors.push(ValidationError::EmptyServer(name.clone()));
        }

        if spec.port == 0 {
            errors.push(ValidationError::ZeroPort {
                name: name.clone(),
                field: "port",
            });
        }

        if spec.listen == 0 {
            errors.push(ValidationError::ZeroPort {
                name: name.clone(),
                field: "listen",
            });
        } else if let Some(first) = listeners.insert(spec.listen, name) {
            errors.push(ValidationError::DuplicateListen {
                first: first.to_string(),
                second: name.clone(),
                port: spec.listen,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_safe_name(name: &str) -> bool {
    name != "."
        && name != ".."
        && !name.chars().any(|c| c == '/' || c == '\\' || c == '\0')
}
