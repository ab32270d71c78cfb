//! Tree registry: in-memory aggregate of loaded tree definitions.

use crate::error::{DefinitionError, TreeError};
use crate::registry::shared_roots::SharedRootSet;
use crate::tree::{TreeDefinition, TreeNode};
use crate::types::{Identifier, Piggybag, PiggybagExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Tree registry
///
/// Keeps definitions in registration order; that order decides how results
/// from several trees are concatenated.
#[derive(Debug, Default)]
pub struct TreeRegistry {
    trees: Vec<Arc<TreeDefinition>>,
    by_id: HashMap<String, usize>,
}

impl TreeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Tree ids must be unique.
    pub fn register(&mut self, tree: TreeDefinition) -> Result<(), DefinitionError> {
        if self.by_id.contains_key(tree.tree_id()) {
            return Err(DefinitionError::DuplicateTree(tree.tree_id().to_string()));
        }
        self.by_id.insert(tree.tree_id().to_string(), self.trees.len());
        self.trees.push(Arc::new(tree));
        Ok(())
    }

    pub fn get(&self, tree_id: &str) -> Option<&Arc<TreeDefinition>> {
        self.by_id.get(tree_id).map(|&i| &self.trees[i])
    }

    /// Get a tree by id or return an error
    pub fn get_or_error(&self, tree_id: &str) -> Result<&Arc<TreeDefinition>, TreeError> {
        self.get(tree_id)
            .ok_or_else(|| TreeError::UnknownTree(tree_id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TreeDefinition>> {
        self.trees.iter()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// The single tree owning a structural identifier, named by the piggyback bag.
    pub fn owning_tree(&self, piggybag: &Piggybag) -> Result<&Arc<TreeDefinition>, TreeError> {
        let tree_id = piggybag.tree_id().ok_or_else(|| TreeError::UnknownTree(String::new()))?;
        self.get_or_error(tree_id)
    }

    /// Trees that apply to `identifier`, in registration order.
    pub fn trees_for(
        &self,
        identifier: &Identifier,
        piggybag: &Piggybag,
        shared_roots: &SharedRootSet,
    ) -> Result<Vec<Arc<TreeDefinition>>, TreeError> {
        match identifier {
            Identifier::PerspectiveRoot { id } => {
                let mut trees: Vec<Arc<TreeDefinition>> = shared_roots
                    .group(id)
                    .map(|group| group.member_trees.clone())
                    .unwrap_or_default();
                for tree in &self.trees {
                    let listed = trees.iter().any(|t| t.tree_id() == tree.tree_id());
                    if !listed && tree.is_attached_to(identifier) {
                        trees.push(Arc::clone(tree));
                    }
                }
                Ok(trees)
            }
            Identifier::ContentRecord { entity_type, .. } => Ok(self
                .trees
                .iter()
                .filter(|tree| {
                    tree.indexes_entity_type(entity_type) || tree.is_attached_to(identifier)
                })
                .cloned()
                .collect()),
            Identifier::SimpleNode { .. }
            | Identifier::GeneratorNode { .. }
            | Identifier::GroupingNode { .. } => {
                Ok(vec![Arc::clone(self.owning_tree(piggybag)?)])
            }
        }
    }

    /// Resolve `identifier` to its node within `tree`.
    pub fn node_for<'t>(
        &self,
        tree: &'t TreeDefinition,
        identifier: &Identifier,
        piggybag: &Piggybag,
    ) -> Result<&'t TreeNode, TreeError> {
        match identifier {
            Identifier::PerspectiveRoot { .. } => Ok(tree.root()),
            Identifier::SimpleNode { node_id }
            | Identifier::GeneratorNode { node_id }
            | Identifier::GroupingNode { node_id, .. } => tree.node(node_id).ok_or_else(|| {
                TreeError::out_of_sync(tree.tree_id(), format!("no node '{}'", node_id))
            }),
            Identifier::ContentRecord { entity_type, .. } => {
                let parent_id = piggybag.parent_node_id().ok_or_else(|| {
                    TreeError::out_of_sync(tree.tree_id(), "piggybag carries no parent node id")
                })?;
                let mut matching = tree
                    .nodes_for_entity_type(entity_type)
                    .filter(|node| node.parent_id() == Some(parent_id));
                match (matching.next(), matching.next()) {
                    (Some(node), None) => Ok(node),
                    (None, _) => Err(TreeError::out_of_sync(
                        tree.tree_id(),
                        format!("no '{}' node under parent '{}'", entity_type, parent_id),
                    )),
                    (Some(_), Some(_)) => Err(TreeError::out_of_sync(
                        tree.tree_id(),
                        format!("several '{}' nodes under parent '{}'", entity_type, parent_id),
                    )),
                }
            }
        }
    }

    /// Resolve a content record to exactly one (tree, node id) pair.
    ///
    /// Candidates are the tree named by the piggyback bag, or every tree whose
    /// reverse index lists the record's type.
    pub fn resolve_record(
        &self,
        identifier: &Identifier,
        piggybag: &Piggybag,
    ) -> Result<(Arc<TreeDefinition>, String), TreeError> {
        let Identifier::ContentRecord { entity_type, .. } = identifier else {
            let detail = format!("'{}' is not a content record", identifier);
            return Err(TreeError::out_of_sync("", detail));
        };

        let candidates: Vec<&Arc<TreeDefinition>> = match piggybag.tree_id() {
            Some(tree_id) => vec![self.get_or_error(tree_id)?],
            None => self
                .trees
                .iter()
                .filter(|tree| tree.indexes_entity_type(entity_type))
                .collect(),
        };
        let scope = match candidates.as_slice() {
            [single] => single.tree_id().to_string(),
            _ => String::new(),
        };

        let parent_id = piggybag.parent_node_id().ok_or_else(|| {
            TreeError::out_of_sync(&scope, "piggybag carries no parent node id")
        })?;

        let mut matches = candidates.into_iter().flat_map(|tree| {
            tree.nodes_for_entity_type(entity_type)
                .filter(move |node| node.parent_id() == Some(parent_id))
                .map(move |node| (tree, node.id().to_string()))
        });

        match (matches.next(), matches.next()) {
            (Some((tree, node_id)), None) => {
                debug!(tree_id = tree.tree_id(), node_id = %node_id, "Resolved content record");
                Ok((Arc::clone(tree), node_id))
            }
            (None, _) => Err(TreeError::out_of_sync(
                &scope,
                format!("no '{}' node under parent '{}'", entity_type, parent_id),
            )),
            (Some(_), Some(_)) => Err(TreeError::out_of_sync(
                &scope,
                format!("several '{}' nodes under parent '{}'", entity_type, parent_id),
            )),
        }
    }
}
