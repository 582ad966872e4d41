//! LMFDB web server
//!
//! Loads configuration, sets up logging, loads the document collections and
//! serves HTTP until the process is terminated.

use anyhow::Context;
use lmfdb_web::{AppState, JsonStore, Server, ServerConfig};
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Main entry point
///
/// # Usage
/// ```bash
/// # Start with default config (lmfdb_web.yaml)
/// lmfdb-web
///
/// # Start with custom config
/// lmfdb-web /path/to/config.yaml
/// ```
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    info!("Starting LMFDB web server");

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "lmfdb_web.yaml".to_string());

    let config = if Path::new(&config_path).exists() {
        info!("Loading configuration from: {}", config_path);
        ServerConfig::from_file(&config_path)
            .with_context(|| format!("invalid configuration in {}", config_path))?
    } else {
        warn!("{} not found, using the default configuration", config_path);
        ServerConfig::default()
    };

    info!("Configuration loaded successfully");
    info!("  - Listen address: {}", config.listen_address);
    info!("  - Data directory: {}", config.data_dir);
    info!("  - Plot directory: {}", config.plot_path().display());
    info!("  - Search page size: {} (max {})", config.search_page_size, config.max_search_page_size);
    info!("  - Zero search time limit: {}s", config.zero_search_time_limit_secs);

    let store = JsonStore::load(&config.data_dir)
        .with_context(|| format!("failed to load collections from {}", config.data_dir))?;

    let server = Server::new(AppState::new(config, Arc::new(store)));
    server.start().await.context("server stopped")?;
    Ok(())
}
