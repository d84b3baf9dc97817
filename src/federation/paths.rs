//! URL and path helpers
//!
//! Pure string functions used to derive base locations, join bundle-relative
//! file names onto them, and compute package identity keys.

use crate::federation::metadata::SharedInfo;

/// Return every `/`-separated segment of `url` except the last.
///
/// No trailing separator is added back: `"http://a/b/remoteEntry.json"`
/// becomes `"http://a/b"`.
pub fn parent_directory(url: &str) -> String {
    match url.rfind('/') {
        Some(idx) => url[..idx].to_string(),
        None => String::new(),
    }
}

/// Join a base location and a relative segment with exactly one separator.
///
/// Trailing separators on `base` are stripped and a single leading `./` on
/// `segment` is removed. An empty segment yields the stripped base, so
/// `join_paths(&join_paths(a, b), "") == join_paths(a, b)`.
pub fn join_paths(base: &str, segment: &str) -> String {
    let base = base.trim_end_matches('/');
    let segment = segment.strip_prefix("./").unwrap_or(segment);
    if segment.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base, segment)
}

/// Identity key of a shared package: `"<name>@<version>"`.
///
/// A missing version yields `"<name>@"`.
pub fn package_identity_key(shared: &SharedInfo) -> String {
    format!(
        "{}@{}",
        shared.package_name,
        shared.version.as_deref().unwrap_or_default()
    )
}
