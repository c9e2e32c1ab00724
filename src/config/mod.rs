//! Configuration management for fullfeed.
//!
//! Configuration is read once at startup from `~/.config/fullfeed/config.toml`
//! (or the path given with `--config`). Missing fields use default values,
//! and a few environment variables override the file afterwards:
//!
//! | Variable               | Setting          |
//! |------------------------|------------------|
//! | `REDIS_URL`            | `cache.url`      |
//! | `CACHE_URL`            | `cache.url`      |
//! | `CACHE_EXPIRY_SECONDS` | `cache.ttl_secs` |
//! | `PORT`                 | `server.port`    |

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cache::{CacheBackend, CacheConfig};
use crate::extractor::ExtractorConfig;
use crate::fetcher::FetcherConfig;
use crate::transform::PipelineConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub extractor: ExtractorConfig,
    pub fetcher: FetcherConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// Listen address. `host` is an IPv4 or IPv6 literal; brackets are optional.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        let ip: IpAddr = host.parse().map_err(|_| {
            ConfigError::Invalid(format!("server.host '{}' is not an IP address", self.host))
        })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when `RUST_LOG` is not set (default: info)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration, then apply environment overrides and validate.
    ///
    /// An explicit `path` must exist. Without one, the default path is used
    /// when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::load_from(path)?
            }
            None => match Self::default_config_path() {
                Ok(path) if path.exists() => Self::load_from(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without overrides or validation.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/fullfeed/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("fullfeed").join("config.toml"))
    }

    /// Apply environment overrides. `lookup` resolves a variable name.
    ///
    /// Empty values are ignored. `CACHE_URL` wins over `REDIS_URL`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("REDIS_URL") {
            self.cache.url = url;
        }
        if let Some(url) = var("CACHE_URL") {
            self.cache.url = url;
        }
        if let Some(ttl) = var("CACHE_EXPIRY_SECONDS") {
            self.cache.ttl_secs = ttl.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "CACHE_EXPIRY_SECONDS",
                value: ttl.clone(),
            })?;
        }
        if let Some(port) = var("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "PORT",
                value: port.clone(),
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Invalid("cache.ttl_secs must be positive".into()));
        }
        if self.cache.timeout_ms == 0 {
            return Err(ConfigError::Invalid("cache.timeout_ms must be positive".into()));
        }
        if self.extractor.timeout_secs == 0 {
            return Err(ConfigError::Invalid("extractor.timeout_secs must be positive".into()));
        }
        CacheBackend::from_url(&self.cache.url).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.server.socket_addr()?;
        Ok(())
    }

    /// Generate the default config file content with comments.
    pub fn default_config_content() -> String {
        r##"# fullfeed configuration
#
# Environment variables REDIS_URL / CACHE_URL, CACHE_EXPIRY_SECONDS and PORT
# override the values below. RUST_LOG overrides [logging].

[server]
host = "0.0.0.0"
port = 3000

[cache]
# redis://host[:port][/db], sqlite:///path/to/cache.db or memory://
url = "redis://127.0.0.1"

# Lifetime of a transformed item in seconds
ttl_secs = 900

# Give up on a cache round-trip after this many milliseconds
timeout_ms = 2000

[fetcher]
# Timeout for feed and article downloads in seconds
timeout_secs = 10

[extractor]
# "http" parses the page directly, "chrome" renders it in headless Chrome
backend = "http"

# Give up on an article after this many seconds and keep the feed content
timeout_secs = 30

# Minimum text length for a selector match to count as the article
min_text_length = 100

# CSS selectors to try for article content extraction (in priority order)
content_selectors = [
    "article",
    "[role=\"main\"]",
    "main",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".content",
    "#content",
    ".post",
    ".article",
    ".blog-post",
]

# Elements to remove before extraction (ads, navigation, etc.)
remove_selectors = [
    "nav",
    "header",
    "footer",
    "aside",
    ".sidebar",
    ".advertisement",
    ".ad",
    ".ads",
    ".social-share",
    ".comments",
    ".related-posts",
    "script",
    "style",
    "noscript",
]

# Chrome backend only
headless = true
wait_after_load_ms = 1000
max_concurrency = 5

[pipeline]
# Items transformed at once per feed request, 0 for no limit
max_concurrency = 0

[logging]
level = "info"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value '{value}' for environment variable {name}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
