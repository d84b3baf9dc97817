//! Import map model and merging

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Specifier -> URL table
pub type Imports = BTreeMap<String, String>;

/// Scope prefix -> specifier table applying only to code under that prefix
pub type Scopes = BTreeMap<String, Imports>;

/// Module resolution table consumed by a module loader
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMap {
    #[serde(default)]
    pub imports: Imports,
    #[serde(default)]
    pub scopes: Scopes,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.scopes.is_empty()
    }

    /// Serialize to the JSON form a module loader expects
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Which side wins when two import maps define the same key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The later map overrides earlier entries
    #[default]
    PreferLast,
    /// The earlier map keeps its entries
    PreferFirst,
}

impl MergePolicy {
    fn merge_table<V: Clone>(self, into: &mut BTreeMap<String, V>, from: &BTreeMap<String, V>) {
        for (key, value) in from {
            match self {
                MergePolicy::PreferLast => {
                    into.insert(key.clone(), value.clone());
                }
                MergePolicy::PreferFirst => {
                    into.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }
    }

    /// Merge `b` into `a`
    ///
    /// Flat imports combine key-wise. Scopes combine by scope prefix as whole
    /// tables; a colliding prefix is decided by the policy like any other key.
    pub fn merge(self, a: &ImportMap, b: &ImportMap) -> ImportMap {
        let mut merged = a.clone();
        self.merge_table(&mut merged.imports, &b.imports);
        self.merge_table(&mut merged.scopes, &b.scopes);
        merged
    }

    /// Left fold of `maps` starting from an empty import map
    pub fn merge_all<'a, I>(self, maps: I) -> ImportMap
    where
        I: IntoIterator<Item = &'a ImportMap>,
    {
        maps.into_iter()
            .fold(ImportMap::new(), |acc, map| self.merge(&acc, map))
    }
}

/// Merge with the later argument winning on collisions
pub fn merge_import_maps(a: &ImportMap, b: &ImportMap) -> ImportMap {
    MergePolicy::PreferLast.merge(a, b)
}
