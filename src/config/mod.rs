//! Configuration management.
//!
//! Configuration is read from `~/.config/blog-rss-server/config.toml` (or an
//! explicit path) at startup, then overridden from the environment:
//!
//! - `RSS_FEED_URL`: the feed to serve
//! - `MCP_TRANSPORT`: `stdio` (default), `sse` or `streamable-http`
//! - `MCP_MOUNT_PATH`: path prefix for the HTTP transport
//!
//! Every field is optional. A missing default config file is not an error.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::scraper::ScraperConfig;

/// Feed URL shipped in the sample configuration; treated as unset.
pub const PLACEHOLDER_FEED_URL: &str = "https://YOUR_BLOG_URL_HERE.com/feed.xml";

pub const ENV_FEED_URL: &str = "RSS_FEED_URL";
pub const ENV_TRANSPORT: &str = "MCP_TRANSPORT";
pub const ENV_MOUNT_PATH: &str = "MCP_MOUNT_PATH";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub scraper: ScraperConfig,
    pub server: ServerConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// RSS/Atom feed of the blog
    pub url: String,

    /// Feed request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: PLACEHOLDER_FEED_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// False when the URL is blank or still the placeholder.
    pub fn is_configured(&self) -> bool {
        let url = self.url.trim();
        !url.is_empty() && url != PLACEHOLDER_FEED_URL
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Transport {
    #[default]
    Stdio,
    Sse,
    StreamableHttp,
}

impl From<&str> for Transport {
    /// Unknown names fall back to stdio.
    fn from(name: &str) -> Self {
        match name.trim() {
            "sse" => Self::Sse,
            "streamable-http" => Self::StreamableHttp,
            _ => Self::Stdio,
        }
    }
}

impl From<String> for Transport {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::StreamableHttp => "streamable-http",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: Transport,

    /// Path prefix the HTTP transport is mounted under
    pub mount_path: Option<String>,

    /// Listen address of the HTTP transport
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            mount_path: None,
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Post pages fetched at once during full-text search (default: 1, sequential)
    pub workers: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`,
    /// then apply environment overrides.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_config_path()?;
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/blog-rss-server/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("blog-rss-server").join("config.toml"))
    }

    /// Override fields from environment variables, looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_FEED_URL) {
            self.feed.url = url;
        }

        if let Some(transport) = lookup(ENV_TRANSPORT) {
            self.server.transport = Transport::from(transport);
        }

        if let Some(mount_path) = lookup(ENV_MOUNT_PATH) {
            let mount_path = mount_path.trim();
            self.server.mount_path = (!mount_path.is_empty()).then(|| mount_path.to_string());
        }
    }

    pub fn is_feed_configured(&self) -> bool {
        self.feed.is_configured()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

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
}
