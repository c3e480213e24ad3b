use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `MAGNETDROP_STORAGE__BASE_URL`.
pub const ENV_PREFIX: &str = "MAGNETDROP_";

/// Load configuration from file with environment variable overrides.
///
/// The file is optional: a deployment may supply everything through the
/// environment. When the file is missing and the environment is not enough
/// to build a complete config, the missing file is reported.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let file_exists = path.exists();

    let mut figment = Figment::new();
    if file_exists {
        figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        };
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    figment.extract().map_err(|e| {
        if file_exists {
            ConfigError::ParseError(e.to_string())
        } else {
            ConfigError::FileNotFound(path.display().to_string())
        }
    })
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
