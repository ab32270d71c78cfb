//! TOML definition store
//!
//! One file declares every tree and shared-root group for a workspace:
//!
//! ```toml
//! [[trees]]
//! id = "content"
//! root = { id = "root", label = "Content" }
//! nodes = [
//!     { id = "pages", parent = "root", label = "Pages", entity_type = "Page" },
//! ]
//! attachments = [{ kind = "perspective", id = "Root", position = "top" }]
//!
//! [[shared_roots]]
//! id = "settings"
//! label = "Settings"
//! trees = ["content"]
//! attachment = { kind = "perspective", id = "Root" }
//! ```

use crate::element::Element;
use crate::error::DefinitionError;
use crate::registry::{SharedRootGroup, SharedRootSource, TreeRegistry};
use crate::tree::{AttachmentPoint, ElementRule, LabelRule, TreeDefinition, TreeDefinitionBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Parsed definition file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionFile {
    #[serde(default)]
    pub trees: Vec<TreeSpec>,
    #[serde(default)]
    pub shared_roots: Vec<SharedRootSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub id: String,
    pub root: RootSpec,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootSpec {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Rule name looked up in the [`RuleCatalog`]; a label rule when absent
    #[serde(default)]
    pub rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    pub parent: String,
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub rule: Option<String>,
    /// Makes this a data node listing records of the given type
    #[serde(default)]
    pub entity_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedRootSpec {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Member tree ids, in display order
    pub trees: Vec<String>,
    pub attachment: AttachmentPoint,
}

impl DefinitionFile {
    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let content = std::fs::read_to_string(path)?;
        let file = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            trees = file.trees.len(),
            shared_roots = file.shared_roots.len(),
            "Loaded definition file"
        );
        Ok(file)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, DefinitionError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate every tree and collect them into a registry, in file order.
    pub fn build_registry(&self, catalog: &RuleCatalog) -> Result<TreeRegistry, DefinitionError> {
        let mut registry = TreeRegistry::new();
        for spec in &self.trees {
            registry.register(spec.build(catalog)?)?;
        }
        Ok(registry)
    }

    /// Shared-root source over `trees`, built from this file's groups.
    pub fn shared_root_source(&self, trees: Arc<TreeRegistry>) -> ConfiguredSharedRoots {
        ConfiguredSharedRoots::new(self.shared_roots.clone(), trees)
    }
}

impl TreeSpec {
    fn build(&self, catalog: &RuleCatalog) -> Result<TreeDefinition, DefinitionError> {
        let root_rule = catalog.resolve(
            &self.id,
            &self.root.id,
            self.root.rule.as_deref(),
            &self.root.label,
            self.root.icon.as_deref(),
        )?;
        let mut builder = TreeDefinitionBuilder::new(&self.id, &self.root.id, root_rule);

        for node in &self.nodes {
            let rule = catalog.resolve(
                &self.id,
                &node.id,
                node.rule.as_deref(),
                &node.label,
                node.icon.as_deref(),
            )?;
            builder = match &node.entity_type {
                Some(entity_type) => builder.data_child(&node.parent, &node.id, entity_type, rule),
                None => builder.child(&node.parent, &node.id, rule),
            };
        }

        for point in &self.attachments {
            builder = builder.attach(point.clone());
        }
        builder.build()
    }
}

/// Named element rules available to definition files.
#[derive(Default, Clone)]
pub struct RuleCatalog {
    rules: HashMap<String, Arc<dyn ElementRule>>,
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, name: impl Into<String>, rule: Arc<dyn ElementRule>) -> Self {
        self.register(name, rule);
        self
    }

    pub fn register(&mut self, name: impl Into<String>, rule: Arc<dyn ElementRule>) {
        self.rules.insert(name.into(), rule);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ElementRule>> {
        self.rules.get(name)
    }

    fn resolve(
        &self,
        tree_id: &str,
        node_id: &str,
        rule: Option<&str>,
        label: &str,
        icon: Option<&str>,
    ) -> Result<Arc<dyn ElementRule>, DefinitionError> {
        match rule {
            Some(name) => self.get(name).cloned().ok_or_else(|| DefinitionError::UnknownRule {
                tree_id: tree_id.to_string(),
                node_id: node_id.to_string(),
                rule: name.to_string(),
            }),
            None => {
                let mut rule = LabelRule::new(label);
                if let Some(icon) = icon {
                    rule = rule.with_icon(icon);
                }
                Ok(Arc::new(rule))
            }
        }
    }
}

impl fmt::Debug for RuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("RuleCatalog").field("rules", &names).finish()
    }
}

/// Shared-root groups declared in a definition file.
///
/// Member trees are looked up when the groups are built, so a group naming a
/// tree that was never registered fails initialization.
pub struct ConfiguredSharedRoots {
    specs: Vec<SharedRootSpec>,
    trees: Arc<TreeRegistry>,
}

impl ConfiguredSharedRoots {
    pub fn new(specs: Vec<SharedRootSpec>, trees: Arc<TreeRegistry>) -> Self {
        Self { specs, trees }
    }
}

impl SharedRootSource for ConfiguredSharedRoots {
    fn load_groups(&self, provider_name: &str) -> Result<Vec<SharedRootGroup>, DefinitionError> {
        self.specs
            .iter()
            .map(|spec| {
                let member_trees = spec
                    .trees
                    .iter()
                    .map(|tree_id| {
                        self.trees.get(tree_id).cloned().ok_or_else(|| {
                            DefinitionError::UnknownMemberTree {
                                group_id: spec.id.clone(),
                                tree_id: tree_id.clone(),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                let mut element = Element::new(format!("perspective:{}", spec.id), &spec.label);
                if let Some(icon) = &spec.icon {
                    element = element.with_icon(icon);
                }
                debug!(
                    provider = provider_name,
                    group_id = %spec.id,
                    members = member_trees.len(),
                    "Built shared root group"
                );

                Ok(SharedRootGroup {
                    group_id: spec.id.clone(),
                    label: spec.label.clone(),
                    member_trees,
                    attachment_point: spec.attachment.clone(),
                    element,
                })
            })
            .collect()
    }
}
