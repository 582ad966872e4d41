//! Configuration management for the LMFDB web server

use crate::error::{LmfdbError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Configuration for the web server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to (default: "127.0.0.1:37777")
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Directory holding the document collections (default: "data")
    ///
    /// Expected files: `abvar_fq_isog.json` and `lfunctions.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory holding the precomputed plot stores (default: "~/data/lfunction_plots")
    #[serde(default = "default_plot_dir")]
    pub plot_dir: String,

    /// Number of search results per page when `count` is not given (default: 50)
    #[serde(default = "default_search_page_size")]
    pub search_page_size: usize,

    /// Upper bound accepted for the `count` search argument (default: 1000)
    #[serde(default = "default_max_search_page_size")]
    pub max_search_page_size: usize,

    /// Time budget in seconds for on-the-fly zero computation (default: 10)
    #[serde(default = "default_zero_time_limit")]
    pub zero_search_time_limit_secs: u64,
}

fn default_listen_address() -> String {
    "127.0.0.1:37777".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_plot_dir() -> String {
    "~/data/lfunction_plots".to_string()
}

fn default_search_page_size() -> usize {
    50
}

fn default_max_search_page_size() -> usize {
    1000
}

fn default_zero_time_limit() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_address: default_listen_address(),
            data_dir: default_data_dir(),
            plot_dir: default_plot_dir(),
            search_page_size: default_search_page_size(),
            max_search_page_size: default_max_search_page_size(),
            zero_search_time_limit_secs: default_zero_time_limit(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    ///
    /// # Returns
    /// * `Ok(ServerConfig)` if loading and validation succeed
    /// * `Err(LmfdbError)` if file cannot be read or config is invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            LmfdbError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: ServerConfig = serde_yaml::from_str(&content).map_err(|e| {
            LmfdbError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Validation Rules
    /// - listen_address must parse as a socket address
    /// - data_dir must not be empty
    /// - search_page_size must be between 1 and max_search_page_size
    /// - zero_search_time_limit_secs must be > 0
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        if self.data_dir.is_empty() {
            return Err(LmfdbError::ConfigError(
                "data_dir must not be empty".to_string(),
            ));
        }

        if self.search_page_size == 0 || self.search_page_size > self.max_search_page_size {
            return Err(LmfdbError::ConfigError(format!(
                "search_page_size must be between 1 and {}, got {}",
                self.max_search_page_size, self.search_page_size
            )));
        }

        if self.zero_search_time_limit_secs == 0 {
            return Err(LmfdbError::ConfigError(
                "zero_search_time_limit_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed listen address
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen_address.parse().map_err(|e| {
            LmfdbError::ConfigError(format!(
                "Invalid listen_address '{}': {}",
                self.listen_address, e
            ))
        })
    }

    /// Plot directory with a leading `~` expanded from `$HOME`
    pub fn plot_path(&self) -> PathBuf {
        expand_home(&self.plot_dir)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
