//! Configuration types for the rewrite synchronizer
//!
//! The configuration is a small YAML document:
//!
//! ```yaml
//! profile_name: home
//! rewrites:
//!   - name: router.lan
//!     content: 10.0.0.1
//!   - name: nas.lan
//!     content: 10.0.0.2
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main synchronizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Name of the NextDNS profile to reconcile (exact match)
    #[serde(default)]
    pub profile_name: String,

    /// Desired rewrites, applied in order
    #[serde(default)]
    pub rewrites: Vec<RewriteSpec>,
}

/// A desired rewrite entry
///
/// Equality with a remote entry is determined solely by `name`; `content`
/// is never compared, so a matching name is always replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteSpec {
    /// The hostname pattern being rewritten
    pub name: String,

    /// The target/answer value
    pub content: String,
}

impl SyncConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Self = serde_yaml::from_str(&raw)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.profile_name.is_empty() {
            return Err(Error::config("Profile name not found in configuration"));
        }

        if self.rewrites.is_empty() {
            return Err(Error::config("No rewrites found in configuration"));
        }

        for rewrite in &self.rewrites {
            if rewrite.name.is_empty() {
                return Err(Error::config("Rewrite with empty name in configuration"));
            }
            if rewrite.content.is_empty() {
                return Err(Error::config(format!(
                    "Rewrite {} has empty content in configuration",
                    rewrite.name
                )));
            }
        }

        Ok(())
    }
}
