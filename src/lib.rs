//! Federation Resolver - runtime import map resolution for federated bundles
//!
//! A host application discovers, at runtime, where to load shared libraries
//! and exposed entry points of remote bundles that were built and deployed
//! separately. This crate fetches each bundle's metadata document, computes
//! the final URLs, and merges everything into one import map.
//!
//! ## Design Principles
//!
//! 1. **One physical copy per shared package**: the first bundle to resolve a
//!    package name and version pins its URL in the [`ResolutionCache`]
//! 2. **Partial-failure isolation**: a broken remote is dropped, never fatal
//! 3. **Explicit state**: the cache is an object passed to the pipeline, not a global
//!
//! ## Example
//!
//! ```rust,no_run
//! use federation_resolver::{Federation, FederationConfig, RemoteSource};
//!
//! # async fn run() -> federation_resolver::Result<()> {
//! let config = FederationConfig {
//!     origin: Some("http://localhost:4200/".to_string()),
//!     ..Default::default()
//! };
//! let federation = Federation::from_config(config)?;
//! let import_map = federation
//!     .init_federation(RemoteSource::from("/assets/federation.manifest.json"))
//!     .await?;
//! println!("{}", import_map.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod federation;
pub mod utils;

pub use config::{FederationConfig, LoggingConfig, RemoteSource};
pub use federation::{
    Federation, FederationError, FederationInfo, ImportMap, MergePolicy, PinningOrder, Remote,
    RemoteTable, ResolutionCache, Result, SharedInfo,
};
