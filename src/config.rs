use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the document API; fixed for the session.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Transport timeout; the sync layer defines no timeout of its own.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Where the bearer token persists between CLI invocations.
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}

fn default_token_path() -> PathBuf {
    PathBuf::from(".pdfsync-token")
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    #[serde(default = "default_list_size")]
    pub list_size: i64,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: i64,
    /// Search results are denser than lists, so the default differs.
    #[serde(default = "default_search_size")]
    pub search_size: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            list_size: default_list_size(),
            chunk_size: default_chunk_size(),
            search_size: default_search_size(),
        }
    }
}

fn default_list_size() -> i64 {
    10
}
fn default_chunk_size() -> i64 {
    10
}
fn default_search_size() -> i64 {
    20
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }
    if !config.api.base_url.starts_with("http://") && !config.api.base_url.starts_with("https://") {
        anyhow::bail!("api.base_url must start with http:// or https://");
    }
    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be > 0");
    }
    for (name, size) in [
        ("pagination.list_size", config.pagination.list_size),
        ("pagination.chunk_size", config.pagination.chunk_size),
        ("pagination.search_size", config.pagination.search_size),
    ] {
        if size < 1 {
            anyhow::bail!("{} must be >= 1", name);
        }
    }
    Ok(())
}
