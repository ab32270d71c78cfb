//! Configuration System
//!
//! Layered configuration for the composition engine and its tooling: defaults,
//! the global file, workspace files, then `CANOPY_*` environment variables.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use config::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

mod merge;
mod sources;

pub use sources::global_file::global_config_path;

pub const ENV_PREFIX: &str = "CANOPY";
pub const DEFAULT_PROVIDER_NAME: &str = "console";
/// Definition file looked up under `<workspace>/config/` when none is configured
pub const DEFAULT_DEFINITIONS_FILE: &str = "trees.toml";

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanopyConfig {
    /// Provider name shared-root groups are built for
    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    /// Tree definition file; relative paths resolve against the workspace root
    #[serde(default)]
    pub definitions: Option<PathBuf>,

    #[serde(default)]
    pub labels: LabelConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Human-readable labels for synthetic elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_error_tree_label")]
    pub error_tree_label: String,
}

fn default_provider_name() -> String {
    DEFAULT_PROVIDER_NAME.to_string()
}

fn default_error_tree_label() -> String {
    crate::engine::diagnostics::DEFAULT_ERROR_TREE_LABEL.to_string()
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            error_tree_label: default_error_tree_label(),
        }
    }
}

impl Default for CanopyConfig {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            definitions: None,
            labels: LabelConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Provider: {0}")]
    Provider(String),
    #[error("Labels: {0}")]
    Labels(String),
    #[error("Logging: {0}")]
    Logging(String),
}

impl CanopyConfig {
    /// Validate the entire configuration, reporting every problem found.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.provider_name.trim().is_empty() {
            errors.push(ValidationError::Provider(
                "provider_name cannot be empty".to_string(),
            ));
        }

        if self.labels.error_tree_label.trim().is_empty() {
            errors.push(ValidationError::Labels(
                "error_tree_label cannot be empty".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError::Logging(format!(
                "unknown level '{}'",
                self.logging.level
            )));
        }
        for (module, level) in &self.logging.modules {
            if !LOG_LEVELS.contains(&level.as_str()) {
                errors.push(ValidationError::Logging(format!(
                    "unknown level '{}' for module '{}'",
                    level, module
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Definition file for `workspace_root`.
    pub fn definitions_path(&self, workspace_root: &Path) -> PathBuf {
        match &self.definitions {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => workspace_root.join(path),
            None => workspace_root.join("config").join(DEFAULT_DEFINITIONS_FILE),
        }
    }
}

/// Turn a validation failure list into one [`ApiError`].
pub fn validation_failed(errors: &[ValidationError]) -> ApiError {
    let lines: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    ApiError::ConfigError(format!(
        "Configuration validation failed:\n{}",
        lines.join("\n")
    ))
}

/// Loads [`CanopyConfig`] from its layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for `workspace_root`.
    ///
    /// Precedence (lowest to highest): defaults, global file, workspace
    /// `config/config.toml`, workspace `config/<CANOPY_ENV>.toml`, environment.
    pub fn load(workspace_root: &Path) -> Result<CanopyConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder);
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root);
        let builder = merge::merge_policy::add_environment(builder);

        let config: CanopyConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            provider = %config.provider_name,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from one explicit file, on top of defaults only.
    pub fn load_from_file(path: &Path) -> Result<CanopyConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Defaults only, without reading any source.
    pub fn defaults() -> Result<CanopyConfig, ApiError> {
        let config: Config = merge::merge_policy::builder_with_defaults()?.build()?;
        Ok(config.try_deserialize()?)
    }
}
