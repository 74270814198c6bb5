pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use invmatch_core::models::config::InvmatchConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invmatch")
        .join("config.json")
}

/// Load the configuration from `--config`, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvmatchConfig> {
    let config = if let Some(path) = config_path {
        InvmatchConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e))?
    } else {
        InvmatchConfig::default()
    };
    Ok(config)
}
