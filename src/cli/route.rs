//! CLI route: single route table and run context. Dispatches to the engine and presentation.

use crate::cli::help::{command_name, output_format};
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_check_report, format_elements, format_has_children, format_results, CheckReport,
    GroupSummary, TreeSummary,
};
use crate::config::{validation_failed, CanopyConfig, ConfigLoader};
use crate::definitions::{DefinitionFile, RuleCatalog};
use crate::engine::{CompositionEngine, StaticLabels};
use crate::error::ApiError;
use crate::registry::{SharedRootRegistry, TreeRegistry};
use crate::types::{Identifier, Piggybag};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Runtime context for CLI execution: loaded configuration, definitions and engine.
pub struct RunContext {
    config: CanopyConfig,
    definitions_path: PathBuf,
    engine: CompositionEngine,
}

impl RunContext {
    /// Build the context from the workspace root, an optional config file and an
    /// optional definition file override.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        definitions_override: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        config.validate().map_err(|errors| validation_failed(&errors))?;

        let definitions_path = match definitions_override {
            Some(path) if path.is_absolute() => path,
            Some(path) => workspace_root.join(path),
            None => config.definitions_path(&workspace_root),
        };
        Self::with_catalog(config, definitions_path, &RuleCatalog::new())
    }

    /// Build the context with named rules available to the definition file.
    pub fn with_catalog(
        config: CanopyConfig,
        definitions_path: PathBuf,
        catalog: &RuleCatalog,
    ) -> Result<Self, ApiError> {
        if !definitions_path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Definition file not found: {}",
                definitions_path.display()
            )));
        }
        let file = DefinitionFile::load(&definitions_path)?;
        let trees = Arc::new(file.build_registry(catalog)?);
        let shared_roots = SharedRootRegistry::new(Arc::new(
            file.shared_root_source(Arc::clone(&trees)),
        ));

        let engine = CompositionEngine::new(&config.provider_name, trees, Arc::new(shared_roots))
            .with_labels(Arc::new(StaticLabels::new(
                config.labels.error_tree_label.clone(),
            )));
        debug!(trees = engine.trees().len(), "Run context ready");

        Ok(Self {
            config,
            definitions_path,
            engine,
        })
    }

    pub fn engine(&self) -> &CompositionEngine {
        &self.engine
    }

    pub fn definitions_path(&self) -> &Path {
        &self.definitions_path
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let span = info_span!("command", name = command_name(command));
        let _entered = span.enter();
        let started = Instant::now();

        if let Some(format) = output_format(command) {
            if format != "text" && format != "json" {
                return Err(ApiError::ConfigError(format!(
                    "Invalid output format: {} (must be 'text' or 'json')",
                    format
                )));
            }
        }

        let result = self.execute_inner(command);
        info!(
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Check { format } => self.handle_check(format),
            Commands::HasChildren { identifier, bag } => {
                let parsed: Identifier = identifier.parse()?;
                let has_children = self.engine.has_children(&parsed, &to_piggybag(bag))?;
                Ok(format_has_children(identifier, has_children))
            }
            Commands::Expand {
                identifier,
                bag,
                format,
            } => {
                let parsed: Identifier = identifier.parse()?;
                let elements = self.engine.expand_children(&parsed, &to_piggybag(bag))?;
                format_elements(identifier, &elements, format)
            }
            Commands::Attachments {
                identifier,
                bag,
                format,
            } => {
                let parsed: Identifier = identifier.parse()?;
                let results = self
                    .engine
                    .merged_root_attachments(&parsed, &to_piggybag(bag))?;
                format_results(identifier, &results, format)
            }
        }
    }

    fn handle_check(&self, format: &str) -> Result<String, ApiError> {
        let shared = self
            .engine
            .shared_root_registry()
            .ensure_initialized(&self.config.provider_name)?;

        let trees = summarize_trees(self.engine.trees());
        let shared_roots = shared
            .groups()
            .iter()
            .map(|group| GroupSummary {
                group_id: group.group_id.clone(),
                label: group.label.clone(),
                members: group
                    .member_trees
                    .iter()
                    .map(|tree| tree.tree_id().to_string())
                    .collect(),
            })
            .collect();

        let report = CheckReport {
            provider_name: self.config.provider_name.clone(),
            definitions: self.definitions_path.display().to_string(),
            trees,
            shared_roots,
        };
        format_check_report(&report, format)
    }
}

fn summarize_trees(trees: &TreeRegistry) -> Vec<TreeSummary> {
    trees
        .iter()
        .map(|tree| {
            let mut entity_types: Vec<String> =
                tree.entity_types().map(str::to_string).collect();
            entity_types.sort();
            TreeSummary {
                tree_id: tree.tree_id().to_string(),
                nodes: tree.node_count(),
                entity_types,
                attachments: tree.attachment_points().len(),
            }
        })
        .collect()
}

fn to_piggybag(entries: &[(String, String)]) -> Piggybag {
    entries.iter().cloned().collect()
}
