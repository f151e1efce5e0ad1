//! Configuration core module.
//!
//! Runtime parameters come from a TOML file or from command-line flags
//! (`clap` derive), with environment support for the API token. [`config`]
//! holds the top-level [`config::Config`]; [`types`] holds the nested
//! capture settings.

pub mod config;
pub mod types;

pub use config::Config;
pub use types::CaptureSettings;
