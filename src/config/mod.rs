//! Configuration management for federation-resolver
//!
//! Handles configuration loading (JSON or TOML) and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::federation::import_map::MergePolicy;
use crate::federation::metadata::RemoteTable;
use crate::federation::orchestrator::PinningOrder;

/// Where the remotes of a run come from
///
/// A string is a manifest URL; a map is a static name -> metadata URL table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteSource {
    /// URL of a manifest document mapping remote names to metadata URLs
    Manifest(String),
    /// Remote names to metadata URLs, in precedence order
    Static(RemoteTable),
}

impl Default for RemoteSource {
    fn default() -> Self {
        Self::Static(RemoteTable::new())
    }
}

impl From<&str> for RemoteSource {
    fn from(manifest_url: &str) -> Self {
        Self::Manifest(manifest_url.to_string())
    }
}

impl From<RemoteTable> for RemoteSource {
    fn from(table: RemoteTable) -> Self {
        Self::Static(table)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "federation_resolver=debug"). RUST_LOG wins.
    pub filter: Option<String>,

    /// Emit JSON log lines (requires the `json-logging` feature)
    #[serde(default)]
    pub json_format: bool,
}

/// Federation resolver configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FederationConfig {
    /// CDN URL template with `{package}` and `{version}` placeholders
    pub cdn_pattern: Option<String>,

    /// Remotes to resolve (static table or manifest URL)
    pub remotes: Option<RemoteSource>,

    /// Abort `process_remote_infos` on the first failed remote instead of
    /// dropping it
    #[serde(default)]
    pub throw_if_remote_not_found: bool,

    /// Order in which remotes pin shared dependency URLs
    #[serde(default)]
    pub pinning: PinningOrder,

    /// Precedence when merged import maps define the same key
    #[serde(default)]
    pub merge_policy: MergePolicy,

    /// Origin that relative locations such as `./remoteEntry.json` resolve against
    pub origin: Option<String>,

    /// HTTP request timeout (seconds). No timeout when unset.
    pub request_timeout_secs: Option<u64>,

    /// Logging configuration
    pub logging: Option<LoggingConfig>,
}

impl FederationConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FederationConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FederationConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, choosing the format by file extension
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            other => Err(anyhow::anyhow!(
                "Unsupported config format {:?} for {:?} (expected .json or .toml)",
                other,
                path
            )),
        }
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(ref pattern) = self.cdn_pattern {
            if !pattern.contains("{package}") {
                return Err(anyhow::anyhow!(
                    "cdn_pattern must contain a {{package}} placeholder: {}",
                    pattern
                ));
            }
        }

        if let Some(ref origin) = self.origin {
            reqwest::Url::parse(origin)
                .map_err(|e| anyhow::anyhow!("Invalid origin {}: {}", origin, e))?;
        }

        if self.request_timeout_secs == Some(0) {
            return Err(anyhow::anyhow!(
                "request_timeout_secs must be greater than 0 when set"
            ));
        }

        Ok(())
    }
}
