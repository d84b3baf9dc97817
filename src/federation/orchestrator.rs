//! Federation orchestration
//!
//! Drives one resolution run: load the manifest (if any), build the host's
//! import map, load and build every remote concurrently, merge the results,
//! and hand the merged map to the installer.
//!
//! ## Failure handling
//!
//! - Manifest failure aborts the run.
//! - Host metadata failure aborts the run.
//! - A remote failure is logged and that remote is left out; the other
//!   remotes and the host are unaffected.
//!
//! There are no retries and no timeouts at this layer.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::config::{FederationConfig, RemoteSource};
use crate::federation::builder::ImportMapBuilder;
use crate::federation::cache::ResolutionCache;
use crate::federation::error::{FederationError, Result};
use crate::federation::import_map::ImportMap;
use crate::federation::install::{ImportMapInstaller, NoopInstaller};
use crate::federation::loader::{load_manifest, load_metadata, Fetcher, HttpFetcher};
use crate::federation::metadata::{FederationInfo, RemoteTable};
use crate::federation::paths::parent_directory;

/// Location of the host's own metadata document
pub const HOST_REMOTE_ENTRY: &str = "./remoteEntry.json";

/// Base the host's shared artifacts are resolved against
pub const HOST_RELATIVE_BASE: &str = "./";

/// Which remote pins a shared dependency URL first
///
/// The host is always built before any remote and pins its own copies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinningOrder {
    /// Each remote is built as soon as its metadata arrives; the first
    /// fetch to settle wins
    #[default]
    Settlement,
    /// All metadata is fetched first, then remotes are built in table order;
    /// the first remote listed wins
    Manifest,
}

/// Resolves a host and its remotes into one import map
pub struct Federation {
    fetcher: Arc<dyn Fetcher>,
    installer: Arc<dyn ImportMapInstaller>,
    cache: ResolutionCache,
    config: FederationConfig,
}

impl Federation {
    /// Create a federation with a fresh cache and no installer
    pub fn new(config: FederationConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            installer: Arc::new(NoopInstaller),
            cache: ResolutionCache::new(),
            config,
        }
    }

    /// Create a federation fetching over HTTP as described by `config`
    pub fn from_config(config: FederationConfig) -> Result<Self> {
        let mut fetcher = match config.origin.as_deref() {
            Some(origin) => HttpFetcher::with_origin(origin)?,
            None => HttpFetcher::new(),
        };
        if let Some(secs) = config.request_timeout_secs {
            fetcher = fetcher.with_timeout(Duration::from_secs(secs))?;
        }
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Share an existing resolution cache
    pub fn with_cache(mut self, cache: ResolutionCache) -> Self {
        self.cache = cache;
        self
    }

    /// Install the merged import map through `installer`
    pub fn with_installer(mut self, installer: Arc<dyn ImportMapInstaller>) -> Self {
        self.installer = installer;
        self
    }

    /// The registry later code uses to look up remotes
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    fn builder(&self) -> ImportMapBuilder<'_> {
        ImportMapBuilder::new(&self.cache, self.config.cdn_pattern.as_deref())
    }

    /// Run with the remotes named in the configuration
    pub async fn init(&self) -> Result<ImportMap> {
        let source = self.config.remotes.clone().unwrap_or_default();
        self.init_federation(source).await
    }

    /// Resolve the host and `remotes` into one import map and install it
    pub async fn init_federation(&self, remotes: RemoteSource) -> Result<ImportMap> {
        let remotes = match remotes {
            RemoteSource::Manifest(url) => load_manifest(self.fetcher.as_ref(), &url)
                .await
                .map_err(|e| FederationError::ManifestFetch {
                    url: url.clone(),
                    reason: e.to_string(),
                })?,
            RemoteSource::Static(table) => table,
        };
        info!("Initializing federation with {} remote(s)", remotes.len());

        let host_info = load_metadata(self.fetcher.as_ref(), HOST_REMOTE_ENTRY)
            .await
            .map_err(|e| FederationError::HostFetch {
                url: HOST_REMOTE_ENTRY.to_string(),
                reason: e.to_string(),
            })?;
        let host_import_map = self.process_host_info(&host_info, HOST_RELATIVE_BASE);

        let remotes_import_map = self.resolve_remotes(&remotes, false).await?;

        let import_map = self
            .config
            .merge_policy
            .merge(&host_import_map, &remotes_import_map);
        self.installer.install(&import_map).await?;

        info!(
            "Federation initialized: {} import(s), {} scope(s)",
            import_map.imports.len(),
            import_map.scopes.len()
        );
        Ok(import_map)
    }

    /// Build the host's import map from an already loaded metadata document
    pub fn process_host_info(&self, host_info: &FederationInfo, relative_base: &str) -> ImportMap {
        self.builder().build_host_import_map(host_info, relative_base)
    }

    /// Load and build every remote in `remotes`, then merge them in table order.
    ///
    /// A failing remote is logged and dropped unless the configuration sets
    /// `throw_if_remote_not_found`, in which case the first failure (in table
    /// order) is returned. `init_federation` always drops failed remotes.
    pub async fn process_remote_infos(&self, remotes: &RemoteTable) -> Result<ImportMap> {
        self.resolve_remotes(remotes, self.config.throw_if_remote_not_found)
            .await
    }

    async fn resolve_remotes(
        &self,
        remotes: &RemoteTable,
        throw_if_remote_not_found: bool,
    ) -> Result<ImportMap> {
        let outcomes: Vec<Result<ImportMap>> = match self.config.pinning {
            PinningOrder::Settlement => {
                join_all(remotes.iter().map(|(name, url)| async move {
                    let (info, base_url) = self.load_remote(url).await?;
                    Ok::<_, FederationError>(
                        self.builder().build_remote_import_map(&info, name, &base_url),
                    )
                }))
                .await
            }
            PinningOrder::Manifest => {
                let loaded = join_all(remotes.iter().map(|(_, url)| self.load_remote(url))).await;
                remotes
                    .iter()
                    .zip(loaded)
                    .map(|((name, _), result)| {
                        result.map(|(info, base_url)| {
                            self.builder().build_remote_import_map(&info, name, &base_url)
                        })
                    })
                    .collect()
            }
        };

        let mut import_maps = Vec::with_capacity(outcomes.len());
        for ((name, url), outcome) in remotes.iter().zip(outcomes) {
            match outcome {
                Ok(import_map) => import_maps.push(import_map),
                Err(e) => {
                    let err = FederationError::RemoteFetch {
                        remote: name.to_string(),
                        url: url.to_string(),
                        reason: e.to_string(),
                    };
                    if throw_if_remote_not_found {
                        return Err(err);
                    }
                    error!(remote = %name, url = %url, "{}", err);
                }
            }
        }

        Ok(self.config.merge_policy.merge_all(&import_maps))
    }

    /// Load and build a single remote, e.g. one discovered after startup.
    ///
    /// When `remote_name` is `None` the document's own name is used.
    pub async fn process_remote_info(
        &self,
        federation_info_url: &str,
        remote_name: Option<&str>,
    ) -> Result<ImportMap> {
        let (info, base_url) = self.load_remote(federation_info_url).await?;
        let remote_name = remote_name.unwrap_or(info.name.as_str()).to_string();
        Ok(self
            .builder()
            .build_remote_import_map(&info, &remote_name, &base_url))
    }

    async fn load_remote(&self, url: &str) -> Result<(FederationInfo, String)> {
        let base_url = parent_directory(url);
        let info = load_metadata(self.fetcher.as_ref(), url).await?;
        Ok((info, base_url))
    }
}

/// Resolve over HTTP with a fresh cache, as configured by `config`
pub async fn init_federation(
    remotes: impl Into<RemoteSource>,
    config: FederationConfig,
) -> Result<(ImportMap, ResolutionCache)> {
    let federation = Federation::from_config(config)?;
    let import_map = federation.init_federation(remotes.into()).await?;
    Ok((import_map, federation.cache))
}
