//! Resolution cache
//!
//! Holds the canonical URL of every shared package identity, the registered
//! remotes by name, and the inverse index from base location to remote name.
//! One instance is created per application and handed to every component
//! that resolves or looks up remotes. Entries are never evicted.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::federation::metadata::{Remote, SharedInfo};
use crate::federation::paths::package_identity_key;

#[derive(Debug, Default)]
struct CacheState {
    /// package identity key -> resolved URL
    externals: HashMap<String, String>,
    /// remote name -> remote descriptor
    remote_names_to_remote: HashMap<String, Remote>,
    /// base URL -> remote name
    base_url_to_remote_names: HashMap<String, String>,
}

/// Shared resolution state for one application instance
///
/// Cloning yields another handle to the same state.
#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    state: Arc<RwLock<CacheState>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<R>(&self, f: impl FnOnce(&CacheState) -> R) -> R {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<R>(&self, f: impl FnOnce(&mut CacheState) -> R) -> R {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// URL previously pinned for this package name and version
    pub fn get_shared_url(&self, shared: &SharedInfo) -> Option<String> {
        let key = package_identity_key(shared);
        self.read(|state| state.externals.get(&key).cloned())
    }

    /// Pin a URL for this package name and version. Overwrites silently.
    pub fn set_shared_url(&self, shared: &SharedInfo, url: impl Into<String>) {
        let key = package_identity_key(shared);
        let url = url.into();
        debug!("Pinning shared {} -> {}", key, url);
        self.write(|state| {
            state.externals.insert(key, url);
        });
    }

    /// Register a remote under `name`, indexing it by its base URL as well
    pub fn register_remote(&self, name: impl Into<String>, remote: Remote) {
        let name = name.into();
        debug!("Registering remote {} at {}", name, remote.base_url);
        self.write(|state| {
            state
                .base_url_to_remote_names
                .insert(remote.base_url.clone(), name.clone());
            state.remote_names_to_remote.insert(name, remote);
        });
    }

    pub fn get_remote(&self, name: &str) -> Option<Remote> {
        self.read(|state| state.remote_names_to_remote.get(name).cloned())
    }

    pub fn has_remote(&self, name: &str) -> bool {
        self.read(|state| state.remote_names_to_remote.contains_key(name))
    }

    pub fn get_remote_name_by_base_url(&self, base_url: &str) -> Option<String> {
        self.read(|state| state.base_url_to_remote_names.get(base_url).cloned())
    }

    /// Whether a remote has been registered at this base URL
    pub fn is_remote_initialized(&self, base_url: &str) -> bool {
        self.read(|state| state.base_url_to_remote_names.contains_key(base_url))
    }

    /// Names of every registered remote, sorted
    pub fn remote_names(&self) -> Vec<String> {
        let mut names = self.read(|state| {
            state
                .remote_names_to_remote
                .keys()
                .cloned()
                .collect::<Vec<_>>()
        });
        names.sort();
        names
    }

    /// Snapshot of the pinned shared URLs
    pub fn externals(&self) -> HashMap<String, String> {
        self.read(|state| state.externals.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::federation::metadata::FederationInfo;

    fn shared(name: &str, version: &str) -> SharedInfo {
        SharedInfo {
            package_name: name.to_string(),
            version: Some(version.to_string()),
            out_file_name: format!("{}.js", name),
        }
    }

    fn remote(name: &str, base_url: &str) -> Remote {
        Remote::new(
            FederationInfo {
                name: name.to_string(),
                exposes: vec![],
                shared: vec![],
            },
            base_url,
        )
    }

    #[test]
    fn test_shared_url_keyed_by_name_and_version() {
        let cache = ResolutionCache::new();
        cache.set_shared_url(&shared("x", "1.0"), "./x.js");

        assert_eq!(cache.get_shared_url(&shared("x", "1.0")).as_deref(), Some("./x.js"));
        assert_eq!(cache.get_shared_url(&shared("x", "2.0")), None);
        assert_eq!(cache.get_shared_url(&shared("y", "1.0")), None);
    }

    #[test]
    fn test_shared_url_ignores_out_file_name() {
        let cache = ResolutionCache::new();
        let mut first = shared("x", "1.0");
        first.out_file_name = "x-abc.js".to_string();
        cache.set_shared_url(&first, "http://r1/x-abc.js");

        let second = shared("x", "1.0");
        assert_eq!(
            cache.get_shared_url(&second).as_deref(),
            Some("http://r1/x-abc.js")
        );
    }

    #[test]
    fn test_set_shared_url_overwrites() {
        let cache = ResolutionCache::new();
        cache.set_shared_url(&shared("x", "1.0"), "a");
        cache.set_shared_url(&shared("x", "1.0"), "b");
        assert_eq!(cache.get_shared_url(&shared("x", "1.0")).as_deref(), Some("b"));
    }

    #[test]
    fn test_register_remote_indexes_by_base_url() {
        let cache = ResolutionCache::new();
        cache.register_remote("r1", remote("r1", "/r1"));

        assert!(cache.has_remote("r1"));
        assert!(!cache.has_remote("r2"));
        assert_eq!(cache.get_remote_name_by_base_url("/r1").as_deref(), Some("r1"));
        assert_eq!(cache.get_remote_name_by_base_url("/r2"), None);
        assert!(cache.is_remote_initialized("/r1"));
        assert!(!cache.is_remote_initialized("/r1/"));
        assert_eq!(cache.get_remote("r1").unwrap().base_url, "/r1");
    }

    #[test]
    fn test_register_remote_is_idempotent() {
        let cache = ResolutionCache::new();
        cache.register_remote("r1", remote("r1", "/r1"));
        cache.register_remote("r1", remote("r1", "/r1"));
        assert_eq!(cache.remote_names(), vec!["r1".to_string()]);
    }

    #[test]
    fn test_clones_share_state() {
        let cache = ResolutionCache::new();
        let handle = cache.clone();
        handle.set_shared_url(&shared("x", "1.0"), "./x.js");
        assert_eq!(cache.externals().len(), 1);
    }
}
