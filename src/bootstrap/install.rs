//! Download and install of the upstream client release.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::bootstrap::BootstrapError;

const RELEASE_BASE: &str = "https://github.com/cbeuw/Cloak/releases/download/v2.9.0";
const RELEASE_VERSION: &str = "v2.9.0";

/// CPU architectures with a published client build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseArch {
    Amd64,
    Arm64,
}

impl ReleaseArch {
    /// Map a Rust target architecture name.
    pub fn from_target(arch: &str) -> Result<Self, BootstrapError> {
        match arch {
            "x86_64" => Ok(Self::Amd64),
            "aarch64" => Ok(Self::Arm64),
            other => Err(BootstrapError::UnsupportedArch(other.to_string())),
        }
    }

    pub fn current() -> Result<Self, BootstrapError> {
        Self::from_target(std::env::consts::ARCH)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for ReleaseArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release asset URL for `arch`.
pub fn release_url(arch: ReleaseArch) -> String {
    format!("{RELEASE_BASE}/ck-client-linux-{arch}-{RELEASE_VERSION}")
}

/// Download the release for `arch` and install it executable at `dest`.
///
/// The body is written to a sibling temp file and renamed into place, so a
/// failed download never leaves a truncated binary at `dest`.
pub async fn install(arch: ReleaseArch, dest: &Path) -> Result<(), BootstrapError> {
    let url = release_url(arch);
    let download_err = |source: reqwest::Error| BootstrapError::Download {
        url: url.clone(),
        source,
    };

    let response = reqwest::get(&url).await.map_err(download_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(BootstrapError::BadStatus {
            url: url.clone(),
            status,
        });
    }
    let body = response.bytes().await.map_err(download_err)?;

    let install_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| BootstrapError::Install { path, source }
    };

    let tmp = temp_path(dest);
    tokio::fs::write(&tmp, &body).await.map_err(install_err(&tmp))?;
    set_executable(&tmp).await.map_err(install_err(&tmp))?;
    tokio::fs::rename(&tmp, dest)
        .await
        .map_err(install_err(dest))?;

    tracing::debug!(url = %url, bytes = body.len(), "Release downloaded");
    Ok(())
}

fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".download");
    dest.with_file_name(name)
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
