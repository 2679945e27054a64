use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{SearchError, SearchResult};
use crate::search::request::{SearchRequest, DEFAULT_CHANNEL_CAPACITY, DEFAULT_TIMEOUT};

/// Process-wide settings, read once at startup and never changed afterwards.
///
/// # Configuration Locations
///
/// Sources are merged in order of increasing precedence:
/// 1. Global `$HOME/.config/filescout/config.yaml`
/// 2. Local `.filescout.yaml` in the current directory
/// 3. Custom config file passed with `--config`
/// 4. Command-line flags (see [`ServerConfig::merge_with_cli`])
///
/// # Configuration Format
///
/// ```yaml
/// # Port the HTTP server listens on
/// port: 8888
///
/// # Directory that is served and searched
/// root: "/srv/files"
///
/// # Time budget for each search
/// timeout: "1s"
///
/// # Only search files with these extensions (empty: all files)
/// extensions:
///   - "txt"
///   - "md"
///
/// # Capacity of the path and result channels
/// channel_capacity: 100
///
/// # Upper bound on concurrent file reads (omit for no bound)
/// max_workers: 64
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory that is served and searched
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Time budget for each search, in humantime syntax ("1s", "250ms")
    #[serde(default = "default_timeout", with = "humantime_duration")]
    pub timeout: Duration,

    /// Extensions to search, without the leading dot.
    /// If empty, every file is searched
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Capacity of the path and result channels
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Upper bound on concurrent file reads
    #[serde(default)]
    pub max_workers: Option<NonZeroUsize>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Values given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub root: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub extensions: Option<Vec<String>>,
    pub max_workers: Option<NonZeroUsize>,
    pub log_level: Option<String>,
}

fn default_port() -> u16 {
    8888
}

fn default_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            root: default_root(),
            timeout: default_timeout(),
            extensions: Vec::new(),
            channel_capacity: default_channel_capacity(),
            max_workers: None,
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus a specific file,
    /// which must exist
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let optional_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("filescout/config.yaml")),
            // Local config
            Some(PathBuf::from(".filescout.yaml")),
        ];
        for path in optional_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges command-line values over the loaded configuration
    pub fn merge_with_cli(mut self, cli: ConfigOverrides) -> Self {
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(root) = cli.root {
            self.root = root;
        }
        if let Some(timeout) = cli.timeout {
            self.timeout = timeout;
        }
        if let Some(extensions) = cli.extensions {
            self.extensions = extensions;
        }
        if cli.max_workers.is_some() {
            self.max_workers = cli.max_workers;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }

    /// Checks the settings that can only be wrong at runtime
    pub fn validate(&self) -> SearchResult<()> {
        if !self.root.is_dir() {
            return Err(SearchError::config_error(format!(
                "root {} is not a directory",
                self.root.display()
            )));
        }
        if self.channel_capacity == 0 {
            return Err(SearchError::config_error(
                "channel_capacity must be at least 1",
            ));
        }
        if self.timeout.is_zero() {
            return Err(SearchError::config_error("timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Builds the search for a `/`-separated list of terms using these settings
    pub fn search_request(&self, segments: &str) -> SearchRequest {
        SearchRequest::from_segments(&self.root, segments)
            .with_extensions(self.extensions.clone())
            .with_deadline(self.timeout)
            .with_max_workers(self.max_workers)
            .with_channel_capacity(self.channel_capacity)
    }
}
