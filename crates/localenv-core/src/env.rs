//! Environment variable handling.

use crate::error::ConfigError;
use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Parse a boolean flag value (`1/true/yes/on`, `0/false/no/off`).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get an environment variable as a boolean.
///
/// Unset yields `Ok(None)`; a value that is not a recognizable boolean is
/// an error rather than a silent `false`.
pub fn get_bool(name: &str) -> Result<Option<bool>, ConfigError> {
    match get_var(name) {
        None => Ok(None),
        Some(v) => parse_bool(&v).map(Some).ok_or(ConfigError::InvalidEnv {
            name: name.to_string(),
            value: v,
        }),
    }
}

/// Get an environment variable as a u32.
pub fn get_u32(name: &str) -> Result<Option<u32>, ConfigError> {
    match get_var(name) {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                name: name.to_string(),
                value: v,
            }),
    }
}

/// Environment variable names read by localenv.
pub mod vars {
    /// Base directory override (default `~/.localenv`).
    pub const LOCALENV_HOME: &str = "LOCALENV_HOME";

    /// Config file override.
    pub const LOCALENV_CONFIG: &str = "LOCALENV_CONFIG";

    /// Base path the store file is kept under.
    pub const LOCALENV_STORE_PATH: &str = "LOCALENV_STORE_PATH";

    /// Passphrase secret entries are encrypted with.
    pub const LOCALENV_SECRET_KEY: &str = "LOCALENV_SECRET_KEY";

    /// Priority attached to resolved values.
    pub const LOCALENV_PRIORITY: &str = "LOCALENV_PRIORITY";

    /// Whether the store is enabled at all.
    pub const LOCALENV_ENABLED: &str = "LOCALENV_ENABLED";

    /// Log level.
    pub const LOCALENV_LOG: &str = "LOCALENV_LOG";
}
