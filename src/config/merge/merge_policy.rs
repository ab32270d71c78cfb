//! Merge rules: defaults first, every later source overrides key by key.

use crate::config::{DEFAULT_PROVIDER_NAME, ENV_PREFIX};
use crate::engine::diagnostics::DEFAULT_ERROR_TREE_LABEL;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};

/// Create a Config builder with defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("provider_name", DEFAULT_PROVIDER_NAME)?
        .set_default("labels.error_tree_label", DEFAULT_ERROR_TREE_LABEL)
}

/// `CANOPY_*` variables; nested keys use `__` (`CANOPY_LABELS__ERROR_TREE_LABEL`).
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__"),
    )
}
