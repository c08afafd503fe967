//! Configuration schema definitions.
//!
//! Mirrors the layout of `config.yml`:
//!
//! ```yaml
//! clients:
//!   home:
//!     server: a.example.com
//!     port: 443
//!     listen: 1080
//!     config: '{"Transport": "direct"}'
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Root of the watched client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SupervisorConfig {
    /// Client instances keyed by their unique name.
    ///
    /// A `BTreeMap` keeps launch order stable across reloads.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub clients: BTreeMap<String, InstanceSpec>,
}

impl SupervisorConfig {
    /// Number of configured instances.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no instances are configured.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// One managed `ck-client` process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InstanceSpec {
    /// Remote server address.
    pub server: String,

    /// Remote server port.
    pub port: u16,

    /// Local port the client listens on.
    pub listen: u16,

    /// Opaque payload, written verbatim to the instance side file.
    #[serde(default)]
    pub config: String,
}

/// `clients: ~` is treated the same as a missing key.
fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, InstanceSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, InstanceSpec>>::deserialize(deserializer)?.unwrap_or_default())
}
