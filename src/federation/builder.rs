//! Import map construction for the host and for each remote
//!
//! Shared dependency URLs are chosen by an ordered [`SharedUrlPolicy`]: the
//! first applicable rule wins. Remotes use CDN pattern, then a URL already
//! pinned in the [`ResolutionCache`], then their own copy. The first bundle
//! to compute its own copy pins it for every bundle processed after it.
//!
//! The host's base is a prefix and is concatenated as given; remote bases are
//! joined with a single `/`.

use tracing::debug;

use crate::federation::cache::ResolutionCache;
use crate::federation::import_map::{ImportMap, Imports};
use crate::federation::metadata::{FederationInfo, Remote, SharedInfo};
use crate::federation::paths::join_paths;

/// Substitute `{package}` and `{version}` into a CDN URL pattern.
///
/// Only the first occurrence of each placeholder is replaced. A missing
/// version substitutes the empty string.
pub fn apply_cdn_pattern(pattern: &str, shared: &SharedInfo) -> String {
    pattern
        .replacen("{package}", &shared.package_name, 1)
        .replacen("{version}", shared.version.as_deref().unwrap_or_default(), 1)
}

/// One way of producing a shared dependency URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedUrlRule {
    /// CDN pattern, whenever one is configured
    Cdn,
    /// CDN pattern, only for dependencies that declare a version
    CdnIfVersioned,
    /// URL already pinned for the same package name and version
    Pinned,
    /// The bundle's own artifact under its base location
    Relative,
    /// The bundle's own artifact with the base prepended verbatim
    Prefixed,
}

impl SharedUrlRule {
    fn is_fallback(self) -> bool {
        matches!(self, SharedUrlRule::Relative | SharedUrlRule::Prefixed)
    }
}

/// Host URL for a shared artifact: `base` is a plain prefix
pub fn prefixed_url(base: &str, shared: &SharedInfo) -> String {
    format!("{}{}", base, shared.out_file_name)
}

/// Ordered list of [`SharedUrlRule`]s evaluated top-down
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedUrlPolicy {
    rules: Vec<SharedUrlRule>,
}

impl SharedUrlPolicy {
    /// Build a policy. `Relative` is appended when no fallback rule is
    /// present so every dependency resolves.
    pub fn new(mut rules: Vec<SharedUrlRule>) -> Self {
        if !rules.iter().any(|rule| rule.is_fallback()) {
            rules.push(SharedUrlRule::Relative);
        }
        Self { rules }
    }

    /// Host order: CDN for versioned packages, else the host's own copy
    pub fn host() -> Self {
        Self::new(vec![SharedUrlRule::CdnIfVersioned, SharedUrlRule::Prefixed])
    }

    /// Remote order: CDN, then pinned URL, then the remote's own copy
    pub fn remote() -> Self {
        Self::new(vec![
            SharedUrlRule::Cdn,
            SharedUrlRule::Pinned,
            SharedUrlRule::Relative,
        ])
    }

    pub fn rules(&self) -> &[SharedUrlRule] {
        &self.rules
    }

    /// Return the URL of the first applicable rule and the rule that produced it
    pub fn resolve(
        &self,
        shared: &SharedInfo,
        base: &str,
        cdn_pattern: Option<&str>,
        cache: &ResolutionCache,
    ) -> (String, SharedUrlRule) {
        // An empty pattern or version counts as absent
        let cdn_pattern = cdn_pattern.filter(|p| !p.is_empty());
        let versioned = shared.version.as_deref().is_some_and(|v| !v.is_empty());

        for rule in &self.rules {
            let url = match rule {
                SharedUrlRule::Cdn => cdn_pattern.map(|p| apply_cdn_pattern(p, shared)),
                SharedUrlRule::CdnIfVersioned => cdn_pattern
                    .filter(|_| versioned)
                    .map(|p| apply_cdn_pattern(p, shared)),
                SharedUrlRule::Pinned => cache.get_shared_url(shared),
                SharedUrlRule::Relative => Some(join_paths(base, &shared.out_file_name)),
                SharedUrlRule::Prefixed => Some(prefixed_url(base, shared)),
            };
            if let Some(url) = url {
                return (url, *rule);
            }
        }
        // Unreachable for policies built through `new`
        (join_paths(base, &shared.out_file_name), SharedUrlRule::Relative)
    }
}

/// Builds partial import maps against one resolution cache
pub struct ImportMapBuilder<'a> {
    cache: &'a ResolutionCache,
    cdn_pattern: Option<&'a str>,
    host_policy: SharedUrlPolicy,
    remote_policy: SharedUrlPolicy,
}

impl<'a> ImportMapBuilder<'a> {
    pub fn new(cache: &'a ResolutionCache, cdn_pattern: Option<&'a str>) -> Self {
        Self {
            cache,
            cdn_pattern,
            host_policy: SharedUrlPolicy::host(),
            remote_policy: SharedUrlPolicy::remote(),
        }
    }

    /// Replace the policy used for remote shared dependencies
    pub fn with_remote_policy(mut self, policy: SharedUrlPolicy) -> Self {
        self.remote_policy = policy;
        self
    }

    /// Build the host's import map.
    ///
    /// Every shared dependency is exposed globally. The host's own relative
    /// copy is always pinned in the cache, even when the public entry points
    /// at the CDN.
    pub fn build_host_import_map(&self, host: &FederationInfo, relative_base: &str) -> ImportMap {
        let mut imports = Imports::new();

        for shared in &host.shared {
            let (url, rule) =
                self.host_policy
                    .resolve(shared, relative_base, self.cdn_pattern, self.cache);
            debug!("Host shared {} -> {} ({:?})", shared.package_name, url, rule);
            imports.insert(shared.package_name.clone(), url);
        }

        for shared in &host.shared {
            self.cache
                .set_shared_url(shared, prefixed_url(relative_base, shared));
        }

        ImportMap {
            imports,
            scopes: Default::default(),
        }
    }

    /// Build a remote's import map and register the remote.
    ///
    /// Exposed modules land in the global imports as `<remote_name>/<key>`.
    /// Shared dependencies land in a scope keyed by `<base_url>/` so they only
    /// apply to imports issued from the remote's own code.
    pub fn build_remote_import_map(
        &self,
        remote: &FederationInfo,
        remote_name: &str,
        base_url: &str,
    ) -> ImportMap {
        let mut map = ImportMap::new();

        for exposed in &remote.exposes {
            let key = join_paths(remote_name, &exposed.key);
            let value = join_paths(base_url, &exposed.out_file_name);
            map.imports.insert(key, value);
        }

        let mut scoped = Imports::new();
        for shared in &remote.shared {
            let (url, rule) = self
                .remote_policy
                .resolve(shared, base_url, self.cdn_pattern, self.cache);
            if rule.is_fallback() {
                self.cache.set_shared_url(shared, url.clone());
            }
            debug!(
                "Remote {} shared {} -> {} ({:?})",
                remote_name, shared.package_name, url, rule
            );
            scoped.insert(shared.package_name.clone(), url);
        }
        map.scopes.insert(format!("{}/", base_url), scoped);

        self.cache
            .register_remote(remote_name, Remote::new(remote.clone(), base_url));

        map
    }
}
