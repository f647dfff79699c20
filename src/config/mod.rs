use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub boards: BoardsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Findora backend (no trailing slash)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("findora-cli/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Directory holding `session.json`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Keep the session in memory only
    #[serde(default)]
    pub ephemeral: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            ephemeral: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    /// Window used to coalesce refreshes after send/read
    #[serde(default = "default_refresh_debounce_ms")]
    pub refresh_debounce_ms: u64,
    #[serde(default = "default_nickname_cache_ttl_secs")]
    pub nickname_cache_ttl_secs: u64,
    #[serde(default = "default_nickname_cache_capacity")]
    pub nickname_cache_capacity: usize,
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            refresh_debounce_ms: default_refresh_debounce_ms(),
            nickname_cache_ttl_secs: default_nickname_cache_ttl_secs(),
            nickname_cache_capacity: default_nickname_cache_capacity(),
            max_message_length: default_max_message_length(),
        }
    }
}

impl MessagingConfig {
    pub fn refresh_debounce(&self) -> Duration {
        Duration::from_millis(self.refresh_debounce_ms)
    }

    pub fn nickname_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.nickname_cache_ttl_secs)
    }
}

fn default_refresh_debounce_ms() -> u64 {
    500
}

fn default_nickname_cache_ttl_secs() -> u64 {
    600
}

fn default_nickname_cache_capacity() -> usize {
    256
}

fn default_max_message_length() -> usize {
    1000
}

/// Category ids of the fixed boards, plus listing sizes
#[derive(Debug, Clone, Deserialize)]
pub struct BoardsConfig {
    #[serde(default = "default_free_board")]
    pub free: i64,
    #[serde(default = "default_research_board")]
    pub research: i64,
    #[serde(default = "default_admission_board")]
    pub admission: i64,
    #[serde(default = "default_notice_board")]
    pub notice: i64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_home_post_count")]
    pub home_post_count: usize,
}

impl Default for BoardsConfig {
    fn default() -> Self {
        Self {
            free: default_free_board(),
            research: default_research_board(),
            admission: default_admission_board(),
            notice: default_notice_board(),
            page_size: default_page_size(),
            home_post_count: default_home_post_count(),
        }
    }
}

fn default_free_board() -> i64 {
    1
}

fn default_research_board() -> i64 {
    2
}

fn default_admission_board() -> i64 {
    3
}

fn default_notice_board() -> i64 {
    4
}

fn default_page_size() -> usize {
    10
}

fn default_home_post_count() -> usize {
    5
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(content).with_context(|| "Failed to parse configuration file")?;
        config.api.base_url = config.api.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.messaging.refresh_debounce(), Duration::from_millis(500));
        assert_eq!(config.messaging.nickname_cache_capacity, 256);
        assert_eq!(config.boards.research, 2);
        assert_eq!(config.logging.level, "info");
        assert!(!config.session.ephemeral);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            [api]
            base_url = "https://findora.example.com/"

            [boards]
            research = 7
            page_size = 20

            [messaging]
            refresh_debounce_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://findora.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.boards.research, 7);
        assert_eq!(config.boards.admission, 3);
        assert_eq!(config.boards.page_size, 20);
        assert_eq!(config.messaging.refresh_debounce_ms, 250);
        assert_eq!(config.messaging.max_message_length, 1000);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(Config::from_toml("[api\nbase_url = 3").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/findora.toml")).unwrap();
        assert_eq!(config.boards.free, 1);
    }
}
