use nutrisense_core::Location;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default backend when none is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize)]
pub struct RemoteConfig {
    pub backend_url: ConfigValue<String>,
    /// Bearer token; absent means signed out
    #[serde(serialize_with = "mask_token")]
    pub token: Option<ConfigValue<String>>,
    pub timeout_secs: ConfigValue<u64>,
}

impl RemoteConfig {
    pub fn token(&self) -> Option<String> {
        self.token.as_ref().map(|t| t.value.clone())
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding state.json
    pub data_dir: ConfigValue<PathBuf>,
    pub remote: RemoteConfig,
    /// Where store distances are measured from
    pub location: ConfigValue<Location>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    remote: RemoteFile,
    location: Option<Location>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RemoteFile {
    backend_url: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut backend_url =
            ConfigValue::new(DEFAULT_BACKEND_URL.to_string(), ConfigSource::Default);
        let mut token = None;
        let mut timeout_secs = ConfigValue::new(DEFAULT_TIMEOUT_SECS, ConfigSource::Default);
        let mut location = ConfigValue::new(Location::default(), ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(url) = file_config.remote.backend_url {
                backend_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(t) = file_config.remote.token {
                token = Some(ConfigValue::new(t, ConfigSource::File));
            }
            if let Some(secs) = file_config.remote.timeout_secs {
                timeout_secs = ConfigValue::new(secs, ConfigSource::File);
            }
            if let Some(loc) = file_config.location {
                location = ConfigValue::new(loc, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("NUTRI_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("NUTRI_BACKEND_URL") {
            backend_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(t) = std::env::var("NUTRI_TOKEN") {
            token = Some(ConfigValue::new(t, ConfigSource::Environment));
        }

        // A blank token means signed out
        let token = token.filter(|t| !t.value.trim().is_empty());

        Ok(Self {
            data_dir,
            remote: RemoteConfig {
                backend_url,
                token,
                timeout_secs,
            },
            location,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/nutrisense/
    /// - macOS: ~/Library/Application Support/nutrisense/
    /// - Windows: %APPDATA%/nutrisense/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nutrisense")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/nutrisense/
    /// - macOS: ~/Library/Application Support/nutrisense/
    /// - Windows: %APPDATA%/nutrisense/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nutrisense")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn mask_token<S>(token: &Option<ConfigValue<String>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let masked = token
        .as_ref()
        .map(|t| ConfigValue::new("****", t.source.clone()));
    masked.serialize(serializer)
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
