//! Testing utilities and mock implementations.
//!
//! This module provides a scriptable HTTP transport and config fixtures so
//! the whole pipeline can be exercised without real upstream services.
//!
//! # Example
//!
//! ```rust,ignore
//! use magnetdrop_core::testing::{fixtures, MockTransport};
//!
//! let transport = Arc::new(MockTransport::new());
//! transport.respond_json(HttpMethod::Get, "https://search.example/api/", 200, json!({"data": []})).await;
//!
//! let pipeline = Pipeline::new(transport.clone(), &fixtures::config());
//! ```

mod mock_transport;

pub use mock_transport::{MockTransport, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::config::{
        Config, MagnetSelection, SearchConfig, ServerConfig, StorageConfig, TelegramConfig,
    };

    /// Storage base URL used by the fixtures (trailing slash included).
    pub const STORAGE_BASE_URL: &str = "http://alist.local:5244/";
    /// Login endpoint derived from `STORAGE_BASE_URL`.
    pub const LOGIN_URL: &str = "http://alist.local:5244/api/auth/login";
    /// Offline-download endpoint derived from `STORAGE_BASE_URL`.
    pub const OFFLINE_DOWNLOAD_URL: &str = "http://alist.local:5244/api/fs/add_offline_download";
    /// Search URL prefix used by the fixtures.
    pub const SEARCH_URL: &str = "https://search.example/api/";

    /// Storage config pointing at a fake AList instance.
    pub fn storage_config() -> StorageConfig {
        StorageConfig {
            base_url: STORAGE_BASE_URL.to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            offline_download_dir: "/downloads".to_string(),
            timeout_secs: 10,
        }
    }

    /// Search config with first-entry selection.
    pub fn search_config() -> SearchConfig {
        SearchConfig {
            url: SEARCH_URL.to_string(),
            timeout_secs: 10,
            selection: MagnetSelection::First,
        }
    }

    /// A complete, valid config.
    pub fn config() -> Config {
        Config {
            storage: storage_config(),
            search: search_config(),
            telegram: TelegramConfig {
                token: "123456:TEST-TOKEN".to_string(),
                allowed_user_ids: Vec::new(),
                poll_timeout_secs: 60,
            },
            server: ServerConfig::default(),
        }
    }
}
