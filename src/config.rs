use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub api: ApiConfig,

    pub search: SearchConfig,

    pub notifications: NotificationsConfig,

    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Buffer size of the process-wide broadcast event bus.
    pub event_bus_buffer_size: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            event_bus_buffer_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL. Empty means search features are unavailable,
    /// which is a disabled state rather than an error.
    pub base_url: String,

    /// API key sent as `X-Api-Key`. Empty disables search features.
    pub api_key: String,

    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a suggestion fetch is issued.
    pub debounce_ms: u64,

    /// Minimum trimmed query length for general suggestions.
    pub min_query_len: usize,

    /// Minimum trimmed query length for ingredient suggestions.
    pub min_ingredient_len: usize,

    pub suggestion_limit: usize,

    pub result_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_len: 2,
            min_ingredient_len: 1,
            suggestion_limit: 8,
            result_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub page_size: u32,

    /// Interval of the fallback unread-count poll.
    pub unread_poll_seconds: u64,

    /// Default lifetime of a toast before it expires.
    pub toast_duration_ms: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            unread_poll_seconds: 60,
            toast_duration_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Location of the local key-value cache. Defaults to the platform
    /// data directory when unset.
    pub path: Option<PathBuf>,
}

impl CacheConfig {
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("ladle")
                .join("cache.json")
        })
    }
}

impl Config {
    #[must_use]
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ladle")
            .join("config.toml")
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config at {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config at {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("LADLE_API_URL") {
            config.api.base_url = url;
        }
        if let Ok(key) = std::env::var("LADLE_API_KEY") {
            config.api.api_key = key;
        }

        Ok(config)
    }

    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            info!("Config already exists at {}", path.display());
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;

        info!("Created default config at {}", path.display());
        Ok(path)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api.base_url.is_empty() {
            url::Url::parse(&self.api.base_url)
                .with_context(|| format!("Invalid api.base_url: {}", self.api.base_url))?;
        }
        anyhow::ensure!(
            self.notifications.page_size > 0,
            "notifications.page_size must be positive"
        );
        anyhow::ensure!(
            self.search.debounce_ms > 0,
            "search.debounce_ms must be positive"
        );
        Ok(())
    }

    /// Search availability is gated on both a base URL and an API key.
    #[must_use]
    pub fn search_available(&self) -> bool {
        !self.api.base_url.trim().is_empty() && !self.api.api_key.trim().is_empty()
    }
}
