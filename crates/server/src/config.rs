use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use submission_archive::ExtractLimits;
use tracing::info;

type Result<T> = anyhow::Result<T>;

pub const CONFIG_PATH_ENV: &str = "PLAGCHECK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "plagcheck.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_upload_root")]
    pub upload_root: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default)]
    pub limits: ExtractLimits,
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("failed to deserialize server config")
    }

    /// Load from `PLAGCHECK_CONFIG` (or `plagcheck.toml`), falling back to
    /// defaults when the file does not exist. `DATABASE_URL` overrides the
    /// configured database.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = if Path::new(&path).exists() {
            info!(path = %path, "loading server config");
            Self::from_file(&path)?
        } else {
            info!(path = %path, "config file not found, using defaults");
            Self::default()
        };

        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            config.database_url = database_url;
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            database_url: default_database_url(),
            upload_root: default_upload_root(),
            max_upload_bytes: default_max_upload_bytes(),
            limits: ExtractLimits::default(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_database_url() -> String {
    "sqlite://plagcheck.db?mode=rwc".to_string()
}

fn default_upload_root() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}
