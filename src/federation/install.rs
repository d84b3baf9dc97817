//! Import map installation
//!
//! The final import map is handed to an [`ImportMapInstaller`]. The HTML
//! installer writes it into a document as an `importmap-shim` script so a
//! module-loader polyfill applies it before later dynamic imports resolve.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::federation::error::{FederationError, Result};
use crate::federation::import_map::ImportMap;

/// Script type recognised by the module-loader polyfill
pub const IMPORT_MAP_SCRIPT_TYPE: &str = "importmap-shim";

/// Receives the merged import map at the end of a resolution run
#[async_trait]
pub trait ImportMapInstaller: Send + Sync {
    async fn install(&self, import_map: &ImportMap) -> Result<()>;
}

/// Installer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInstaller;

#[async_trait]
impl ImportMapInstaller for NoopInstaller {
    async fn install(&self, _import_map: &ImportMap) -> Result<()> {
        Ok(())
    }
}

/// Render the import map as a script element
pub fn render_script_tag(import_map: &ImportMap) -> Result<String> {
    // `</` inside a script body would end the element early
    let json = import_map
        .to_json()
        .map_err(|e| FederationError::Install(e.to_string()))?
        .replace("</", "<\\/");
    Ok(format!(
        "<script type=\"{}\">{}</script>",
        IMPORT_MAP_SCRIPT_TYPE, json
    ))
}

/// Insert the script element before `</head>`, or append it when the
/// document has no head
pub fn inject_into_html(html: &str, import_map: &ImportMap) -> Result<String> {
    let tag = render_script_tag(import_map)?;
    let lower = html.to_ascii_lowercase();
    Ok(match lower.find("</head>") {
        Some(idx) => format!("{}{}\n{}", &html[..idx], tag, &html[idx..]),
        None => format!("{}{}\n", html, tag),
    })
}

/// Writes the import map into an HTML file in place
#[derive(Debug, Clone)]
pub struct HtmlInstaller {
    path: PathBuf,
}

impl HtmlInstaller {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ImportMapInstaller for HtmlInstaller {
    async fn install(&self, import_map: &ImportMap) -> Result<()> {
        let html = tokio::fs::read_to_string(&self.path).await?;
        let updated = inject_into_html(&html, import_map)?;
        tokio::fs::write(&self.path, updated).await?;
        info!(
            "Installed import map with {} import(s) into {:?}",
            import_map.imports.len(),
            self.path
        );
        Ok(())
    }
}
