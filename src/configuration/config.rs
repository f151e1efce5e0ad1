use std::net::IpAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use super::types::CaptureSettings;
use crate::error_handling::types::ConfigError;
use crate::storage::backend::StorageOptions;
use crate::storage::types::BackendKind;

/// Application configuration structure that defines all runtime parameters.
///
/// Parsed from the command line via `clap` or from a TOML file; a file given
/// with `--config-file` replaces the command-line values wholesale.
///
/// # Fields Overview
///
/// - `bind_address` / `web_port` / `web_enabled`: web interface exposure
/// - `storage_backend`: preferred backend; others are fallbacks
/// - `storage_path`: directory for the file and database backends
/// - `remote_base_url` / `api_token`: remote backend + HTTP auth secret
/// - `entry_point`: companion entry address checked for the activation
///   marker at startup
/// - `capture`: URL classification policy for the interception taps
#[derive(Parser, Debug, Clone, Deserialize)]
#[command(name = "transcap", version, about = "Caption capture and transcript store")]
pub struct Config {
    /// TOML configuration file replacing all other flags
    #[arg(long)]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Network address to bind the web interface to
    #[arg(long, default_value = "127.0.0.1")]
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port for the web interface
    #[arg(long, default_value_t = default_web_port())]
    #[serde(default = "default_web_port")]
    pub web_port: u16,

    /// Serve the web interface (`--web-enabled=false` to run headless)
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    #[serde(default = "default_true")]
    pub web_enabled: bool,

    /// Preferred storage backend; automatic fallback applies when it cannot
    /// initialize
    #[arg(long, value_enum, default_value_t = BackendKind::Database)]
    #[serde(default = "default_backend")]
    pub storage_backend: BackendKind,

    /// Directory for locally persisted data
    #[arg(long, default_value = "./transcap_data")]
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Base URL of a remote transcript server (remote backend only)
    #[arg(long)]
    #[serde(default)]
    pub remote_base_url: Option<String>,

    /// Bearer secret gating the HTTP surface; also sent by the remote
    /// backend
    #[arg(long, env = "TRANSCAP_API_TOKEN")]
    #[serde(default)]
    pub api_token: Option<String>,

    /// Companion entry address; when it carries `auto=1`, clipboard
    /// auto-consumption is attempted at startup
    #[arg(long)]
    #[serde(default)]
    pub entry_point: Option<String>,

    #[command(flatten)]
    #[serde(default)]
    pub capture: CaptureSettings,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_web_port() -> u16 {
    8350
}

fn default_true() -> bool {
    true
}

fn default_backend() -> BackendKind {
    BackendKind::Database
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./transcap_data")
}

impl Config {
    /// Parses the command line, then loads the TOML file if one was named.
    pub fn load() -> Result<Self, ConfigError> {
        let cli = Config::parse();
        let config = match &cli.config_file {
            Some(path) => Config::from_file(path)?,
            None => cli,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_ip()?;
        if self.web_port == 0 {
            return Err(ConfigError::BadPortRange(
                "web port must be non-zero".to_string(),
            ));
        }
        if self.storage_backend == BackendKind::Remote {
            if self.remote_base_url.is_none() {
                return Err(ConfigError::MissingRemoteUrl);
            }
            if self.api_token.is_none() {
                return Err(ConfigError::MissingApiToken);
            }
        }
        Ok(())
    }

    pub fn bind_ip(&self) -> Result<IpAddr, ConfigError> {
        self.bind_address
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::BadBindAddress(format!("{}: {}", self.bind_address, e)))
    }

    pub fn storage_options(&self) -> StorageOptions {
        StorageOptions {
            preferred: self.storage_backend,
            storage_path: self.storage_path.clone(),
            remote_base_url: self.remote_base_url.clone(),
            api_token: self.api_token.clone(),
        }
    }
}
