//! Client binary bootstrap.
//!
//! # Responsibilities
//! - Resolve the `ck-client` executable before the supervisor starts
//! - Install it from the upstream release when it is missing
//!
//! # Design Decisions
//! - Resolution sits behind [`BinaryProvider`] so the supervisor can be
//!   driven by a fixed path (tests, `--binary`)
//! - Search path first, then the well-known install location, then install
//! - Unsupported architectures are fatal and never retried

pub mod install;

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use install::{release_url, ReleaseArch};

/// Executable name looked up on the search path.
pub const BINARY_NAME: &str = "ck-client";

/// Where the binary is installed when it is not on the search path.
pub const SYSTEM_PATH: &str = "/usr/bin/ck-client";

/// Errors raised while making the client binary available.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("unsupported architecture: {0}")]
    UnsupportedArch(String),

    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to download {url}: server returned {status}")]
    BadStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to install {path}: {source}")]
    Install {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("client binary {0} does not exist")]
    Missing(PathBuf),
}

/// Something that can hand the supervisor a runnable client binary.
pub trait BinaryProvider {
    /// Return the binary path, installing it first if needed.
    fn ensure_binary_present(&self)
        -> impl Future<Output = Result<PathBuf, BootstrapError>> + Send;
}

/// A binary given explicitly; never installs anything.
#[derive(Debug, Clone)]
pub struct FixedBinary {
    path: PathBuf,
}

impl FixedBinary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BinaryProvider for FixedBinary {
    async fn ensure_binary_present(&self) -> Result<PathBuf, BootstrapError> {
        if self.path.is_file() {
            Ok(self.path.clone())
        } else {
            Err(BootstrapError::Missing(self.path.clone()))
        }
    }
}

/// Search path lookup with install fallback.
#[derive(Debug, Clone)]
pub struct SystemBinary {
    name: String,
    install_path: PathBuf,
}

impl Default for SystemBinary {
    fn default() -> Self {
        Self {
            name: BINARY_NAME.to_string(),
            install_path: PathBuf::from(SYSTEM_PATH),
        }
    }
}

impl SystemBinary {
    /// Resolve without installing.
    pub fn resolve(&self) -> Option<PathBuf> {
        resolve_binary(&self.name, &self.install_path)
    }
}

impl BinaryProvider for SystemBinary {
    async fn ensure_binary_present(&self) -> Result<PathBuf, BootstrapError> {
        if let Some(path) = self.resolve() {
            tracing::debug!(path = %path.display(), "Client binary found");
            return Ok(path);
        }

        let arch = ReleaseArch::current()?;
        tracing::info!(arch = %arch, "Client binary missing, installing");
        install::install(arch, &self.install_path).await?;
        tracing::info!(path = %self.install_path.display(), "Client binary installed");
        Ok(self.install_path.clone())
    }
}

fn resolve_binary(name: &str, install_path: &Path) -> Option<PathBuf> {
    which::which(name)
        .ok()
        .or_else(|| install_path.exists().then(|| install_path.to_path_buf()))
}
