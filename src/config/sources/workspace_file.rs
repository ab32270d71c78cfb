//! Workspace config file source: config/config.toml and config/{env}.toml

use crate::config::ENV_PREFIX;
use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use std::path::Path;

/// Add workspace config files to `builder`.
/// Precedence: config/config.toml (base) then config/{CANOPY_ENV}.toml.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> ConfigBuilder<DefaultState> {
    let config_dir = workspace_root.join("config");
    let env_name =
        std::env::var(format!("{}_ENV", ENV_PREFIX)).unwrap_or_else(|_| "development".to_string());

    for path in [
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", env_name)),
    ] {
        if path.exists() {
            builder = builder.add_source(File::from(path.as_path()).required(false));
        }
    }
    builder
}
