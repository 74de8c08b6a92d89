//! Configuration system for the `tasksync` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/tasksync/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use tasksync_proto::task::MAX_TASK_TEXT_LENGTH;

use crate::cli::Command;
use crate::filter::{FilterKind, UnknownFilter};
use crate::gateway::http::DEFAULT_CONNECT_TIMEOUT;
use crate::window::DEFAULT_WINDOW_SIZE;

/// Service URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:10000/api/tasks";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The configured default filter is not a known filter.
    #[error("invalid default filter: {0}")]
    InvalidFilter(#[from] UnknownFilter),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    gateway: GatewayFileConfig,
    view: ViewFileConfig,
    form: FormFileConfig,
}

/// `[gateway]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct GatewayFileConfig {
    base_url: Option<String>,
    connect_timeout_secs: Option<u64>,
}

/// `[view]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ViewFileConfig {
    window_size: Option<usize>,
    default_filter: Option<String>,
}

/// `[form]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct FormFileConfig {
    max_text_len: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    // -- Gateway --
    /// Collection URL of the task service.
    pub base_url: String,
    /// Timeout for establishing a connection to the service.
    pub connect_timeout: Duration,

    // -- View --
    /// Rows materialized per window.
    pub window_size: usize,
    /// Filter applied when `list` is given none.
    pub default_filter: FilterKind,

    // -- Form --
    /// Maximum task description length in characters.
    pub max_text_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            window_size: DEFAULT_WINDOW_SIZE,
            default_filter: FilterKind::All,
            max_text_len: MAX_TASK_TEXT_LENGTH,
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// Otherwise the default path (`~/.config/tasksync/config.toml`) is tried
    /// and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed,
    /// or names an unknown default filter.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let default_filter = match &file.view.default_filter {
            Some(name) => name.parse()?,
            None => defaults.default_filter,
        };

        Ok(Self {
            base_url: cli
                .base_url
                .clone()
                .or_else(|| file.gateway.base_url.clone())
                .unwrap_or(defaults.base_url),
            connect_timeout: file
                .gateway
                .connect_timeout_secs
                .map_or(defaults.connect_timeout, Duration::from_secs),
            window_size: cli
                .window_size
                .or(file.view.window_size)
                .unwrap_or(defaults.window_size)
                .max(1),
            default_filter,
            max_text_len: file.form.max_text_len.unwrap_or(defaults.max_text_len),
        })
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Manage an ordered task list on a remote task service")]
pub struct CliArgs {
    /// Collection URL of the task service.
    #[arg(long, env = "TASKSYNC_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Path to config file (default: `~/.config/tasksync/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Rows shown per page by `list`.
    #[arg(long, global = true)]
    pub window_size: Option<usize>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKSYNC_LOG", global = true)]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/tasksync.log`).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// What to do (default: `list`).
    #[command(subcommand)]
    pub command: Option<Command>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            // No config dir available, use defaults.
            return Ok(ConfigFile::default());
        };
        config_dir.join("tasksync").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
