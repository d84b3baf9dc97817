//! Federation metadata documents
//!
//! Shapes of the per-bundle metadata document (`remoteEntry.json`), the
//! manifest mapping remote names to metadata URLs, and the registered remote
//! descriptor.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Metadata document published by every bundle, host or remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationInfo {
    /// Bundle name
    pub name: String,
    /// Modules this bundle makes importable by other bundles
    #[serde(default)]
    pub exposes: Vec<ExposedModule>,
    /// Shared dependencies contributed or consumed by this bundle
    #[serde(default)]
    pub shared: Vec<SharedInfo>,
}

/// A module exposed by a remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposedModule {
    /// Public key other bundles import it by (e.g. `./Component`)
    pub key: String,
    /// Compiled artifact, relative to the bundle's base location
    pub out_file_name: String,
}

/// A shared dependency entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedInfo {
    /// Package name (e.g. `@angular/core`)
    pub package_name: String,
    /// Package version, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Bundled artifact, relative to the bundle's base location
    pub out_file_name: String,
}

/// A metadata document together with the directory it was fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remote {
    #[serde(flatten)]
    pub info: FederationInfo,
    /// Base location of the remote (no trailing separator)
    pub base_url: String,
}

impl Remote {
    pub fn new(info: FederationInfo, base_url: impl Into<String>) -> Self {
        Self {
            info,
            base_url: base_url.into(),
        }
    }
}

/// Ordered table of remote name -> metadata document URL
///
/// Iteration order is insertion order; it decides merge precedence between
/// remotes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteTable {
    entries: Vec<(String, String)>,
}

impl RemoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a remote. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) {
        let name = name.into();
        let url = url.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = url,
            None => self.entries.push((name, url)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, url)| url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, u)| (n.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, U: Into<String>> FromIterator<(N, U)> for RemoteTable {
    fn from_iter<I: IntoIterator<Item = (N, U)>>(iter: I) -> Self {
        let mut table = RemoteTable::new();
        for (name, url) in iter {
            table.insert(name, url);
        }
        table
    }
}

impl Serialize for RemoteTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, url) in &self.entries {
            map.serialize_entry(name, url)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RemoteTable {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // serde_json's preserve_order keeps document order here
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut table = RemoteTable::new();
        for (name, value) in map {
            match value {
                serde_json::Value::String(url) => table.insert(name, url),
                other => {
                    return Err(serde::de::Error::custom(format!(
                        "remote {} must map to a URL string, found {}",
                        name, other
                    )))
                }
            }
        }
        Ok(table)
    }
}

/// Metadata validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<String>),
}

impl FederationInfo {
    /// Check the document for entries that would produce broken import map
    /// entries. Problems are reported, not fixed.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push("Bundle name cannot be empty".to_string());
        }

        for exposed in &self.exposes {
            if exposed.key.is_empty() {
                errors.push("Exposed module key cannot be empty".to_string());
            }
            if exposed.out_file_name.is_empty() {
                errors.push(format!("Exposed module {} has no outFileName", exposed.key));
            }
        }

        for shared in &self.shared {
            if shared.package_name.is_empty() {
                errors.push("Shared dependency package name cannot be empty".to_string());
            }
            if shared.out_file_name.is_empty() {
                errors.push(format!(
                    "Shared dependency {} has no outFileName",
                    shared.package_name
                ));
            }
        }

        if errors.is_empty() {
            debug!("Metadata validation passed for bundle: {}", self.name);
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }
}
