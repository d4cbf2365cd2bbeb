use super::rate::{TradingPair, validate_ttl};
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_TTL_SECONDS: u64 = 60;
pub const DEFAULT_UPSTREAM_URL: &str = "https://coredexapi.shieldnest.org";
pub const DEFAULT_BATCH_SIZE: usize = 200;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied when a request does not carry its own.
    pub default_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub network: String,
    pub timeout_seconds: u64,
    /// Pre-provisioned credential, forwarded as a bearer token.
    pub api_key: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            network: "mainnet".to_string(),
            timeout_seconds: 10,
            api_key: None,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct WarmerConfig {
    /// Cap on pairs read from the registry per cycle.
    pub batch_size: usize,
    /// Pairs refreshed in parallel.
    pub concurrency: usize,
    /// Run a warm cycle on this interval while serving. Disabled when unset.
    pub interval_seconds: Option<u64>,
}

impl Default for WarmerConfig {
    fn default() -> Self {
        WarmerConfig {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: 4,
            interval_seconds: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:8080".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub cache: CacheConfig,
    pub upstream: UpstreamConfig,
    pub warmer: WarmerConfig,
    pub server: ServerConfig,
    pub data_path: Option<String>,
    /// Keep rates in memory only.
    pub ephemeral: bool,
    /// Pairs registered as active at startup.
    pub pairs: Vec<TradingPair>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            let mut config = Self::default();
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config.validate()?;
            return Ok(config);
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "ratecache", "ratecache")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("org", "ratecache", "ratecache")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Applies `RATES_TTL_SECONDS` and `COREDEX_VPS_BASE` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ttl) = lookup("RATES_TTL_SECONDS") {
            self.cache.default_ttl_seconds = ttl
                .trim()
                .parse()
                .with_context(|| format!("Invalid RATES_TTL_SECONDS: {ttl}"))?;
            debug!(ttl = self.cache.default_ttl_seconds, "TTL overridden from environment");
        }
        if let Some(base_url) = lookup("COREDEX_VPS_BASE") {
            debug!(%base_url, "Upstream base URL overridden from environment");
            self.upstream.base_url = base_url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_ttl(self.cache.default_ttl_seconds)
            .context("Invalid cache.default_ttl_seconds")?;
        if self.warmer.batch_size == 0 {
            bail!("warmer.batch_size must be positive");
        }
        if self.warmer.concurrency == 0 {
            bail!("warmer.concurrency must be positive");
        }
        if self.warmer.interval_seconds == Some(0) {
            bail!("warmer.interval_seconds must be positive when set");
        }
        if self.upstream.base_url.trim().is_empty() {
            bail!("upstream.base_url must not be empty");
        }
        Ok(())
    }
}
