//! Federation resolution pipeline
//!
//! Turns a host bundle plus a set of independently deployed remotes into
//! one import map.
//!
//! ## Data flow
//!
//! ```text
//! Federation ──► manifest / static table
//!     │
//!     ├─► loader (host ./remoteEntry.json) ──► builder (host)   ──┐
//!     └─► loader (each remote, concurrent) ──► builder (remote) ──┼─► merge ──► installer
//!                                                  │              │
//!                                                  └── ResolutionCache (pins + registry)
//! ```

pub mod builder;
pub mod cache;
pub mod error;
pub mod import_map;
pub mod install;
pub mod loader;
pub mod metadata;
pub mod orchestrator;
pub mod paths;

pub use builder::{apply_cdn_pattern, prefixed_url, ImportMapBuilder, SharedUrlPolicy, SharedUrlRule};
pub use cache::ResolutionCache;
pub use error::{FederationError, Result};
pub use import_map::{merge_import_maps, ImportMap, Imports, MergePolicy, Scopes};
pub use install::{
    inject_into_html, render_script_tag, HtmlInstaller, ImportMapInstaller, NoopInstaller,
};
pub use loader::{load_manifest, load_metadata, Fetcher, FsFetcher, HttpFetcher};
pub use metadata::{ExposedModule, FederationInfo, Remote, RemoteTable, SharedInfo};
pub use orchestrator::{init_federation, Federation, PinningOrder, HOST_REMOTE_ENTRY};
pub use paths::{join_paths, package_identity_key, parent_directory};
