//! Resolve a federation into an import map
//!
//! Loads the host's `remoteEntry.json` and every remote's metadata, prints the
//! merged import map as JSON, and optionally installs it into an HTML file.
//!
//! ```text
//! resolve-import-map --origin http://localhost:4200/ --manifest /assets/federation.manifest.json
//! resolve-import-map --root dist/shell --remote mfe1=./mfe1/remoteEntry.json --html dist/shell/index.html
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use federation_resolver::federation::{Fetcher, FsFetcher, HtmlInstaller};
use federation_resolver::utils::init_logging_from_config;
use federation_resolver::{Federation, FederationConfig, LoggingConfig, RemoteSource, RemoteTable};

#[derive(Debug, Parser)]
#[command(name = "resolve-import-map", version, about = "Resolve federated bundles into an import map")]
struct Args {
    /// Configuration file (.json or .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Manifest URL mapping remote names to metadata URLs
    #[arg(short, long, conflicts_with = "remote")]
    manifest: Option<String>,

    /// Remote as NAME=URL (repeatable)
    #[arg(short, long, value_parser = parse_remote)]
    remote: Vec<(String, String)>,

    /// CDN URL pattern with {package} and {version} placeholders
    #[arg(long)]
    cdn_pattern: Option<String>,

    /// Origin that relative URLs resolve against
    #[arg(long, conflicts_with = "root")]
    origin: Option<String>,

    /// Serve documents from this directory instead of HTTP
    #[arg(long)]
    root: Option<PathBuf>,

    /// Insert the import map into this HTML file
    #[arg(long)]
    html: Option<PathBuf>,

    /// Log filter (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_remote(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, url)) if !name.is_empty() && !url.is_empty() => {
            Ok((name.to_string(), url.to_string()))
        }
        _ => Err(format!("expected NAME=URL, got {}", s)),
    }
}

fn build_config(args: &Args) -> Result<FederationConfig> {
    let mut config = match &args.config {
        Some(path) => FederationConfig::from_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => FederationConfig::default(),
    };

    if let Some(ref manifest) = args.manifest {
        config.remotes = Some(RemoteSource::Manifest(manifest.clone()));
    } else if !args.remote.is_empty() {
        let table: RemoteTable = args.remote.iter().cloned().collect();
        config.remotes = Some(RemoteSource::Static(table));
    }
    if args.cdn_pattern.is_some() {
        config.cdn_pattern = args.cdn_pattern.clone();
    }
    if args.origin.is_some() {
        config.origin = args.origin.clone();
    }
    if args.log_level.is_some() {
        let logging = config.logging.get_or_insert_with(LoggingConfig::default);
        logging.filter = args.log_level.clone();
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args)?;
    init_logging_from_config(config.logging.as_ref());

    let mut federation = match &args.root {
        Some(root) => {
            let fetcher: Arc<dyn Fetcher> = Arc::new(FsFetcher::new(root));
            Federation::new(config, fetcher)
        }
        None => Federation::from_config(config)?,
    };
    if let Some(ref html) = args.html {
        federation = federation.with_installer(Arc::new(HtmlInstaller::new(html)));
    }

    let import_map = federation.init().await?;
    println!("{}", import_map.to_json_pretty()?);
    Ok(())
}
