use reqwest::Url;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Storage base URL and search URL are absolute http(s) URLs
/// - Username, download directory and bot token are not empty
/// - Timeouts are not 0
/// - Server port is not 0 when the endpoint is enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_http_url("storage.base_url", &config.storage.base_url)?;
    validate_http_url("search.url", &config.search.url)?;

    require_non_empty("storage.username", &config.storage.username)?;
    require_non_empty(
        "storage.offline_download_dir",
        &config.storage.offline_download_dir,
    )?;
    require_non_empty("telegram.token", &config.telegram.token)?;

    if config.storage.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "storage.timeout_secs cannot be 0".to_string(),
        ));
    }
    if config.search.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "search.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.server.enabled && config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    require_non_empty(field, value)?;

    let url = Url::parse(value)
        .map_err(|e| ConfigError::ValidationError(format!("{} is not a valid URL: {}", field, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::ValidationError(format!(
            "{} must use http or https, got {}",
            field, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        MagnetSelection, SearchConfig, ServerConfig, StorageConfig, TelegramConfig,
    };

    fn valid_config() -> Config {
        Config {
            storage: StorageConfig {
                base_url: "http://alist.local:5244/".to_string(),
                username: "admin".to_string(),
                password: "secret".to_string(),
                offline_download_dir: "/downloads".to_string(),
                timeout_secs: 10,
            },
            search: SearchConfig {
                url: "https://search.example/api/".to_string(),
                timeout_secs: 10,
                selection: MagnetSelection::First,
            },
            telegram: TelegramConfig {
                token: "123:abc".to_string(),
                allowed_user_ids: Vec::new(),
                poll_timeout_secs: 60,
            },
            server: ServerConfig::default(),
        }
    }

    fn assert_invalid(config: &Config, needle: &str) {
        match validate_config(config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains(needle), "unexpected message: {}", msg)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_base_url() {
        let mut config = valid_config();
        config.storage.base_url = "  ".to_string();
        assert_invalid(&config, "storage.base_url");
    }

    #[test]
    fn test_validate_rejects_relative_search_url() {
        let mut config = valid_config();
        config.search.url = "search/api".to_string();
        assert_invalid(&config, "search.url");
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let mut config = valid_config();
        config.storage.base_url = "ftp://alist.local/".to_string();
        assert_invalid(&config, "http or https");
    }

    #[test]
    fn test_validate_rejects_empty_download_dir() {
        let mut config = valid_config();
        config.storage.offline_download_dir = String::new();
        assert_invalid(&config, "offline_download_dir");
    }

    #[test]
    fn test_validate_rejects_empty_bot_token() {
        let mut config = valid_config();
        config.telegram.token = String::new();
        assert_invalid(&config, "telegram.token");
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = valid_config();
        config.search.timeout_secs = 0;
        assert_invalid(&config, "search.timeout_secs");
    }

    #[test]
    fn test_validate_port_zero_only_matters_when_enabled() {
        let mut config = valid_config();
        config.server.port = 0;
        assert!(validate_config(&config).is_ok());

        config.server.enabled = true;
        assert_invalid(&config, "server.port");
    }
}
