use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment variables that override config values.
///
/// Nested keys are separated by `__`, e.g. `MEDIACUT_CONVERTER__TIMEOUT_SECS`.
pub const CONFIG_ENV_PREFIX: &str = "MEDIACUT_";

/// `MEDIACUT_CONFIG` names the config file and is not a config key.
const CONFIG_PATH_KEY: &str = "config";

/// Load configuration from defaults, an optional TOML file and the environment.
///
/// The plain `PORT` variable, when set, overrides `server.port`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let config: Config = figment
        .merge(
            Env::prefixed(CONFIG_ENV_PREFIX)
                .ignore(&[CONFIG_PATH_KEY])
                .split("__"),
        )
        .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
