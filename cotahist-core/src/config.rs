//! Runtime configuration for the fetcher and CLI.
//!
//! Configuration is an explicit value passed into [`crate::data::Fetcher`]
//! and the CLI entry point — never ambient global state — so tests can supply
//! isolated configurations.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Official location of the COTAHIST series.
pub const DEFAULT_BASE_URL: &str = "https://bvmf.bmfbovespa.com.br/InstDados/SerHist/COTAHIST_";

const DEFAULT_USER_AGENT: &str = concat!("cotahist/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root directory for downloaded archives, one subdirectory per year.
    pub data_dir: PathBuf,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// URL prefix the granularity code and date digits are appended to.
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with the `DATA_DIR` and `COTAHIST_USER_AGENT`
    /// environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(agent) = std::env::var_os("COTAHIST_USER_AGENT") {
            config.user_agent = agent.to_string_lossy().into_owned();
        }
        config
    }

    /// Loads a TOML config file. Missing keys fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `$DATA_DIR/raw/b3/cotacaohistorica`, with `DATA_DIR` defaulting to
/// `~/data` (or `./data` when no home directory is known).
fn default_data_dir() -> PathBuf {
    let base = std::env::var_os("DATA_DIR")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join("data")))
        .unwrap_or_else(|| PathBuf::from("data"));
    base.join("raw").join("b3").join("cotacaohistorica")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
