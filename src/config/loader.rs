//! Configuration loading from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::SupervisorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// File name of the watched client configuration inside the config root.
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path} not found")]
    NotFound { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Path of `config.yml` inside a config root.
pub fn config_file_path(config_root: &Path) -> PathBuf {
    config_root.join(CONFIG_FILE_NAME)
}

/// Load and validate configuration from a YAML file.
///
/// Always reads from disk. A file with no YAML content, or a null
/// document, yields an empty configuration.
pub fn load_config(path: &Path) -> Result<SupervisorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let config = parse_config(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = %path.display(), instances = config.len(), "Configuration loaded");
    Ok(config)
}

fn parse_config(content: &str) -> Result<SupervisorConfig, serde_yaml::Error> {
    if is_blank_document(content) {
        return Ok(SupervisorConfig::default());
    }
    // A document that is just `~` or `null` is an empty configuration.
    Ok(serde_yaml::from_str::<Option<SupervisorConfig>>(content)?.unwrap_or_default())
}

fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}
