//! Configuration loader with file and environment variable support

use crate::config::{Config, DEFAULT_REALTIME_API};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &["ig-realtime.toml", "./config/ig-realtime.toml"];

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "IG_REALTIME_CONFIG";

/// On-disk configuration layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct FileConfig {
    client_id: String,
    client_secret: String,
    callback_url: String,
    realtime_api: String,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            callback_url: String::new(),
            realtime_api: DEFAULT_REALTIME_API.to_string(),
            timeout_secs: None,
            user_agent: None,
        }
    }
}

impl FileConfig {
    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    fn into_config(self) -> Config {
        let mut config = Config::new(self.client_id, self.client_secret, self.callback_url)
            .with_realtime_api(self.realtime_api);
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        config
    }
}

/// Configuration loader
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<Config> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Load configuration reading overrides through `lookup` instead of the
    /// process environment.
    pub fn load_with<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut file_config = FileConfig::default();

        if let Some(path) = self.find_config_file(&lookup)? {
            info!(?path, "Loading configuration from file");
            file_config = FileConfig::from_file(&path)?;
        }

        Self::apply_env_overrides(&mut file_config, &lookup);

        let config = file_config.into_config();
        Self::validate(&config)?;
        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file<F>(&self, lookup: &F) -> Result<Option<PathBuf>>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An explicit path must exist
        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path.clone()));
        }

        if let Some(path) = lookup(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        Ok(CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists()))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides<F>(config: &mut FileConfig, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("INSTAGRAM_CLIENT_ID") {
            config.client_id = val;
        }
        if let Some(val) = lookup("INSTAGRAM_CLIENT_SECRET") {
            config.client_secret = val;
        }
        if let Some(val) = lookup("INSTAGRAM_CALLBACK_URL") {
            config.callback_url = val;
        }
        if let Some(val) = lookup("INSTAGRAM_REALTIME_API") {
            config.realtime_api = val;
        }
        if let Some(val) = lookup("INSTAGRAM_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.timeout_secs = Some(secs);
            }
        }
    }

    fn validate(config: &Config) -> Result<()> {
        let required = [
            ("client_id", &config.client_id),
            ("client_secret", &config.client_secret),
            ("callback_url", &config.callback_url),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{name} is required")));
            }
        }
        Ok(())
    }
}
