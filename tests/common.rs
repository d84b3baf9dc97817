//! Shared fixtures for federation tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use federation_resolver::federation::{
    ExposedModule, Fetcher, FederationError, ImportMap, ImportMapInstaller, Result,
};
use federation_resolver::{FederationInfo, SharedInfo};

/// In-memory document server
///
/// Unknown URLs fail like a 404. A per-URL delay controls which fetch
/// settles first.
#[derive(Default)]
pub struct MemoryFetcher {
    documents: HashMap<String, (String, Duration)>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, url: &str, body: impl serde::Serialize) -> Self {
        let body = serde_json::to_string(&body).unwrap();
        self.documents.insert(url.to_string(), (body, Duration::ZERO));
        self
    }

    pub fn with_raw(mut self, url: &str, body: &str) -> Self {
        self.documents
            .insert(url.to_string(), (body.to_string(), Duration::ZERO));
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        if let Some(entry) = self.documents.get_mut(url) {
            entry.1 = delay;
        }
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        let (body, delay) = self
            .documents
            .get(url)
            .cloned()
            .ok_or_else(|| FederationError::Fetch {
                url: url.to_string(),
                reason: "server returned 404 Not Found".to_string(),
            })?;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(body)
    }
}

/// Installer that records every import map it receives
#[derive(Default)]
pub struct RecordingInstaller {
    pub installed: Mutex<Vec<ImportMap>>,
}

#[async_trait]
impl ImportMapInstaller for RecordingInstaller {
    async fn install(&self, import_map: &ImportMap) -> Result<()> {
        self.installed.lock().unwrap().push(import_map.clone());
        Ok(())
    }
}

pub fn shared(name: &str, version: Option<&str>, out_file_name: &str) -> SharedInfo {
    SharedInfo {
        package_name: name.to_string(),
        version: version.map(str::to_string),
        out_file_name: out_file_name.to_string(),
    }
}

pub fn exposed(key: &str, out_file_name: &str) -> ExposedModule {
    ExposedModule {
        key: key.to_string(),
        out_file_name: out_file_name.to_string(),
    }
}

pub fn info(name: &str, exposes: Vec<ExposedModule>, shared: Vec<SharedInfo>) -> FederationInfo {
    FederationInfo {
        name: name.to_string(),
        exposes,
        shared,
    }
}

pub fn arc<F: Fetcher + 'static>(fetcher: F) -> Arc<F> {
    Arc::new(fetcher)
}
