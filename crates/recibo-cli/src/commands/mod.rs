//! CLI command implementations.

use std::path::{Path, PathBuf};

use recibo_core::ReciboConfig;

pub mod batch;
pub mod config;
pub mod latest;
pub mod process;

/// Default configuration file location, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| ReciboConfig::default_path_in(&dir))
}

/// Load configuration from `-c`, the default location, or built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ReciboConfig> {
    let default = default_config_path();
    Ok(ReciboConfig::load_or_default(
        config_path.map(Path::new),
        default.as_deref(),
    )?)
}
