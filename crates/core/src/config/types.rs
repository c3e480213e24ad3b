use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Storage service (AList-compatible) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Base URL of the storage service (e.g., "http://localhost:5244/")
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Directory offline-download jobs are written into
    pub offline_download_dir: String,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Catalog search service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// URL prefix; the catalog code is appended verbatim
    pub url: String,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    #[serde(default)]
    pub selection: MagnetSelection,
}

/// How a magnet link is picked from the search response
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MagnetSelection {
    /// First entry of the result list.
    #[default]
    First,
    /// Smallest entry among the high-quality cluster, newest on ties.
    Best,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub token: String,
    /// Users allowed to talk to the bot. Empty means everyone.
    #[serde(default)]
    pub allowed_user_ids: Vec<i64>,
    /// Long-poll timeout in seconds (default: 60)
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u32,
}

/// Health/metrics endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    9090
}

fn default_timeout() -> u32 {
    10
}

fn default_poll_timeout() -> u32 {
    60
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub storage: SanitizedStorageConfig,
    pub search: SearchConfig,
    pub telegram: SanitizedTelegramConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStorageConfig {
    pub base_url: String,
    pub username: String,
    pub password_configured: bool,
    pub offline_download_dir: String,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTelegramConfig {
    pub token_configured: bool,
    pub allowed_user_count: usize,
    pub poll_timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            storage: SanitizedStorageConfig {
                base_url: config.storage.base_url.clone(),
                username: config.storage.username.clone(),
                password_configured: !config.storage.password.is_empty(),
                offline_download_dir: config.storage.offline_download_dir.clone(),
                timeout_secs: config.storage.timeout_secs,
            },
            search: config.search.clone(),
            telegram: SanitizedTelegramConfig {
                token_configured: !config.telegram.token.is_empty(),
                allowed_user_count: config.telegram.allowed_user_ids.len(),
                poll_timeout_secs: config.telegram.poll_timeout_secs,
            },
            server: config.server.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[storage]
base_url = "http://alist.local:5244/"
username = "admin"
password = "hunter2"
offline_download_dir = "/downloads"

[search]
url = "https://search.example/api/"

[telegram]
token = "123:abc"
"#;

    #[test]
    fn test_deserialize_minimal_config_applies_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.storage.timeout_secs, 10);
        assert_eq!(config.search.timeout_secs, 10);
        assert_eq!(config.search.selection, MagnetSelection::First);
        assert!(config.telegram.allowed_user_ids.is_empty());
        assert_eq!(config.telegram.poll_timeout_secs, 60);
        assert!(!config.server.enabled);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_best_selection_and_allowed_users() {
        let toml = r#"
[storage]
base_url = "http://alist.local:5244"
username = "admin"
password = "hunter2"
offline_download_dir = "/downloads"

[search]
url = "https://search.example/api/"
selection = "best"

[telegram]
token = "123:abc"
allowed_user_ids = [1, 2]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.search.selection, MagnetSelection::Best);
        assert_eq!(config.telegram.allowed_user_ids, vec![1, 2]);
    }

    #[test]
    fn test_deserialize_missing_storage_fails() {
        let toml = r#"
[search]
url = "https://search.example/api/"

[telegram]
token = "123:abc"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.storage.password_configured);
        assert!(sanitized.telegram.token_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("123:abc"));
    }
}
