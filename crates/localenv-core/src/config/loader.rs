//! Configuration loading and persistence.

use super::{Config, LogFormat, LogLevel};
use crate::env;
use crate::error::ConfigError;
use crate::passphrase::Passphrase;
use crate::paths;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Load from `path` (or the default path), falling back to defaults
    /// when the file does not exist. A file that exists but fails to parse
    /// is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => paths::config_file()?,
        };

        match Self::load(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config file");
                Ok(config)
            }
            Err(ConfigError::NotFound(_)) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply `LOCALENV_*` environment overrides on top of the loaded values.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(path) = env::get_var(env::vars::LOCALENV_STORE_PATH) {
            self.store.path = Some(paths::expand_tilde(&path));
        }
        if let Some(key) = env::get_var(env::vars::LOCALENV_SECRET_KEY) {
            self.store.secret_key = Some(Passphrase::new(key));
        }
        if let Some(priority) = env::get_u32(env::vars::LOCALENV_PRIORITY)? {
            self.store.priority = priority;
        }
        if let Some(enabled) = env::get_bool(env::vars::LOCALENV_ENABLED)? {
            self.store.enabled = enabled;
        }
        if let Some(level) = env::get_var(env::vars::LOCALENV_LOG) {
            self.logging.level =
                LogLevel::parse(&level).ok_or_else(|| ConfigError::InvalidEnv {
                    name: env::vars::LOCALENV_LOG.to_string(),
                    value: level.clone(),
                })?;
        }
        Ok(())
    }

    /// Save configuration to a file path.
    ///
    /// The file may hold the secret key, so it is created owner-only before
    /// any content is written, under a temporary name unique to this call,
    /// and then renamed into place.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = temp_path_for(path);
        let written = write_owner_only(&temp_path, content.as_bytes())
            .and_then(|()| fs::rename(&temp_path, path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid JSON5
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.store.enabled {
            match &self.store.path {
                None => errors.push("store.path is not set".to_string()),
                Some(p) if p.as_os_str().is_empty() => {
                    errors.push("store.path must not be empty".to_string())
                }
                Some(_) => {}
            }

            match &self.store.secret_key {
                None => errors.push("store.secret_key is not set".to_string()),
                Some(k) if k.is_blank() => {
                    errors.push("store.secret_key must not be empty".to_string())
                }
                Some(_) => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// The configured store base path, or `<base>/data` when unset.
    pub fn store_path_or_default(&self) -> Result<PathBuf, ConfigError> {
        match &self.store.path {
            Some(p) => Ok(p.clone()),
            None => paths::data_dir(),
        }
    }

    /// A copy safe to print: the secret key is replaced with a marker.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.store.secret_key.is_some() {
            copy.store.secret_key = Some(Passphrase::new("[REDACTED]"));
        }
        copy
    }
}

/// `.{file}.{pid}.{random}.tmp` next to `path`.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(
        ".{file_name}.{}.{:016x}.tmp",
        std::process::id(),
        rand::random::<u64>()
    ))
}

/// Create `path` (which must not exist) as 0600, then write and sync `data`.
fn write_owner_only(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

/// Configuration builder for creating configs programmatically.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the store base path.
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store.path = Some(path.into());
        self
    }

    /// Set the secret key.
    pub fn secret_key(mut self, key: impl Into<Passphrase>) -> Self {
        self.config.store.secret_key = Some(key.into());
        self
    }

    /// Set the priority.
    pub fn priority(mut self, priority: u32) -> Self {
        self.config.store.priority = priority;
        self
    }

    /// Enable or disable the store.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.store.enabled = enabled;
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Build the config.
    pub fn build(self) -> Config {
        self.config
    }

    /// Validate and build the config, returning an error if validation fails.
    pub fn build_validated(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
