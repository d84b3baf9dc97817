//! Metadata and manifest loading
//!
//! A [`Fetcher`] retrieves a document body by URL; [`load_metadata`] and
//! [`load_manifest`] parse it. Each call issues exactly one retrieval and
//! never retries.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::federation::error::{FederationError, Result};
use crate::federation::metadata::{FederationInfo, RemoteTable, ValidationResult};

/// Retrieves raw document bodies
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the body at `url` as text
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Fetches documents over HTTP(S)
///
/// Relative locations such as `./remoteEntry.json` are resolved against the
/// configured origin.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    origin: Option<Url>,
}

impl HttpFetcher {
    /// Create a fetcher without an origin; only absolute URLs can be fetched
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            origin: None,
        }
    }

    /// Create a fetcher resolving relative URLs against `origin`
    pub fn with_origin(origin: &str) -> Result<Self> {
        let origin = Url::parse(origin).map_err(|e| {
            FederationError::Config(format!("Invalid origin {}: {}", origin, e))
        })?;
        Ok(Self {
            client: Client::new(),
            origin: Some(origin),
        })
    }

    /// Apply a request timeout to every retrieval
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    fn resolve(&self, url: &str) -> Result<Url> {
        if let Ok(absolute) = Url::parse(url) {
            return Ok(absolute);
        }
        let origin = self.origin.as_ref().ok_or_else(|| FederationError::Fetch {
            url: url.to_string(),
            reason: "relative URL requires an origin".to_string(),
        })?;
        origin.join(url).map_err(|e| FederationError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let resolved = self.resolve(url)?;
        debug!("GET {}", resolved);

        let response = self
            .client
            .get(resolved.clone())
            .send()
            .await
            .map_err(|e| FederationError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FederationError::Fetch {
                url: url.to_string(),
                reason: format!("server returned {}", response.status()),
            });
        }

        response.text().await.map_err(|e| FederationError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Serves documents from a local directory, e.g. a built `dist/` tree
///
/// `./a/remoteEntry.json`, `/a/remoteEntry.json` and `file://` URLs map
/// to paths under the root. Other schemes are rejected.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf> {
        let path = if let Some(rest) = url.strip_prefix("file://") {
            rest
        } else if url.contains("://") {
            return Err(FederationError::Fetch {
                url: url.to_string(),
                reason: "unsupported scheme for local fetcher".to_string(),
            });
        } else {
            url
        };

        let mut resolved = self.root.clone();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    return Err(FederationError::Fetch {
                        url: url.to_string(),
                        reason: "path escapes fetcher root".to_string(),
                    })
                }
            }
        }
        Ok(resolved)
    }
}

#[async_trait]
impl Fetcher for FsFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let path = self.resolve(url)?;
        debug!("Reading {:?}", path);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FederationError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Fetch and parse one metadata document
pub async fn load_metadata(fetcher: &dyn Fetcher, url: &str) -> Result<FederationInfo> {
    let body = fetcher.fetch_text(url).await?;
    let info: FederationInfo =
        serde_json::from_str(&body).map_err(|e| FederationError::InvalidDocument {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if let ValidationResult::Invalid(errors) = info.validate() {
        warn!("Using metadata from {} despite problems: {:?}", url, errors);
    }

    Ok(info)
}

/// Fetch and parse a manifest of remote name -> metadata URL
pub async fn load_manifest(fetcher: &dyn Fetcher, url: &str) -> Result<RemoteTable> {
    let body = fetcher.fetch_text(url).await?;
    let table: RemoteTable =
        serde_json::from_str(&body).map_err(|e| FederationError::InvalidDocument {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    debug!("Manifest {} lists {} remote(s)", url, table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_http_resolve_relative_against_origin() {
        let fetcher = HttpFetcher::with_origin("http://localhost:4200/app/").unwrap();
        assert_eq!(
            fetcher.resolve("./remoteEntry.json").unwrap().as_str(),
            "http://localhost:4200/app/remoteEntry.json"
        );
        assert_eq!(
            fetcher.resolve("http://cdn/x.json").unwrap().as_str(),
            "http://cdn/x.json"
        );
    }

    #[test]
    fn test_http_relative_without_origin_fails() {
        let fetcher = HttpFetcher::new();
        assert!(matches!(
            fetcher.resolve("./remoteEntry.json"),
            Err(FederationError::Fetch { .. })
        ));
    }

    #[test]
    fn test_invalid_origin_rejected() {
        assert!(matches!(
            HttpFetcher::with_origin("not a url"),
            Err(FederationError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_fs_fetcher_loads_metadata() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("mfe1")).unwrap();
        std::fs::write(
            dir.path().join("mfe1").join("remoteEntry.json"),
            r#"{"name":"mfe1","exposes":[],"shared":[]}"#,
        )
        .unwrap();

        let fetcher = FsFetcher::new(dir.path());
        let info = load_metadata(&fetcher, "./mfe1/remoteEntry.json").await.unwrap();
        assert_eq!(info.name, "mfe1");

        let info = load_metadata(&fetcher, "/mfe1/remoteEntry.json").await.unwrap();
        assert_eq!(info.name, "mfe1");
    }

    #[tokio::test]
    async fn test_fs_fetcher_rejects_escape_and_http() {
        let dir = TempDir::new().unwrap();
        let fetcher = FsFetcher::new(dir.path());
        assert!(fetcher.fetch_text("../secret.json").await.is_err());
        assert!(fetcher.fetch_text("http://host/remoteEntry.json").await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_document_is_invalid() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("remoteEntry.json"), "{not json").unwrap();
        let fetcher = FsFetcher::new(dir.path());
        let err = load_metadata(&fetcher, "./remoteEntry.json").await.unwrap_err();
        assert!(matches!(err, FederationError::InvalidDocument { .. }));
    }

    #[tokio::test]
    async fn test_document_with_problems_still_loads() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("remoteEntry.json"),
            r#"{"name":"mfe1","exposes":[{"key":"","outFileName":"a.js"}],"shared":[]}"#,
        )
        .unwrap();
        let fetcher = FsFetcher::new(dir.path());
        let info = load_metadata(&fetcher, "./remoteEntry.json").await.unwrap();
        assert!(matches!(info.validate(), ValidationResult::Invalid(ref e) if e.len() == 1));
        assert_eq!(info.exposes.len(), 1);
    }

    #[tokio::test]
    async fn test_load_manifest() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("federation.manifest.json"),
            r#"{"mfe1":"http://localhost:4201/remoteEntry.json"}"#,
        )
        .unwrap();
        let fetcher = FsFetcher::new(dir.path());
        let table = load_manifest(&fetcher, "federation.manifest.json").await.unwrap();
        assert_eq!(table.get("mfe1"), Some("http://localhost:4201/remoteEntry.json"));
    }
}
