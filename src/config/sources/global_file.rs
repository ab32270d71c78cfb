//! Global config file source: $XDG_CONFIG_HOME/canopy/config.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use directories::BaseDirs;
use std::path::PathBuf;
use tracing::debug;

/// Path to the global config file, if a home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join("canopy").join("config.toml"))
}

/// Add the global config file to `builder` if it exists.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    match global_config_path() {
        Some(path) if path.exists() => {
            debug!(config_path = %path.display(), "Using global configuration");
            builder.add_source(File::from(path.as_path()).required(false))
        }
        _ => builder,
    }
}
