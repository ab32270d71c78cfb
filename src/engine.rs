//! Composition Engine
//!
//! Resolves an identifier against every tree definition and shared-root group
//! that applies, evaluates the matching nodes and merges the results.
//!
//! Per-tree faults never escape a public call: they are reported through the
//! configured [`FailureReporter`] and replaced by a single error element.
//! Shared-root initialization failures are the exception and are returned.

pub mod diagnostics;

use crate::element::{merge_results, CompositionResult, Element, SHARED_ROOT_PRIORITY};
use crate::error::{ApiError, TreeError};
use crate::registry::{SharedRootRegistry, SharedRootSet, TreeRegistry};
use crate::tree::{AttachmentPoint, DynamicContext, TreeDefinition};
use crate::types::{Identifier, Piggybag, PiggybagExt};
use diagnostics::Diagnostics;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub use diagnostics::{FailureReporter, LabelSource, StaticLabels, TracingReporter};

/// Composition engine
///
/// Holds only read-only registries and collaborators, so one instance can be
/// shared across threads.
pub struct CompositionEngine {
    provider_name: String,
    trees: Arc<TreeRegistry>,
    shared_roots: Arc<SharedRootRegistry>,
    diagnostics: Diagnostics,
}

impl CompositionEngine {
    pub fn new(
        provider_name: impl Into<String>,
        trees: Arc<TreeRegistry>,
        shared_roots: Arc<SharedRootRegistry>,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            trees,
            shared_roots,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.diagnostics.reporter = reporter;
        self
    }

    pub fn with_labels(mut self, labels: Arc<dyn LabelSource>) -> Self {
        self.diagnostics.labels = labels;
        self
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn trees(&self) -> &TreeRegistry {
        &self.trees
    }

    pub fn shared_root_registry(&self) -> &SharedRootRegistry {
        &self.shared_roots
    }

    fn shared_roots(&self) -> Result<Arc<SharedRootSet>, ApiError> {
        self.shared_roots.ensure_initialized(&self.provider_name)
    }

    /// Whether any applicable tree has a root with at least one child node.
    ///
    /// Structural check only; element rules are not evaluated.
    #[instrument(skip(self, piggybag), fields(provider = %self.provider_name, identifier = %identifier))]
    pub fn has_children(
        &self,
        identifier: &Identifier,
        piggybag: &Piggybag,
    ) -> Result<bool, ApiError> {
        let shared = self.shared_roots()?;
        match self.trees.trees_for(identifier, piggybag, &shared) {
            Ok(trees) => Ok(trees.iter().any(|tree| tree.root().has_children())),
            Err(e) => {
                debug!(error = %e, "No tree applies");
                Ok(false)
            }
        }
    }

    /// One result per (tree, matching attachment point), then one per matching
    /// shared-root group.
    ///
    /// The root itself is never shown: a tree contributes the elements of its
    /// root's child nodes at each attachment point.
    ///
    /// The iterator is lazy and single-pass; each yielded result is already fully
    /// evaluated. A failing tree yields a result holding one error element.
    #[instrument(skip(self, piggybag), fields(provider = %self.provider_name, identifier = %identifier))]
    pub fn expand_root_attachments<'a>(
        &'a self,
        identifier: &'a Identifier,
        piggybag: &'a Piggybag,
    ) -> Result<impl Iterator<Item = CompositionResult> + 'a, ApiError> {
        let shared = self.shared_roots()?;

        let trees = self
            .trees
            .trees_for(identifier, piggybag, &shared)
            .unwrap_or_else(|e| {
                debug!(error = %e, "No tree applies");
                Vec::new()
            });

        let group_results: Vec<CompositionResult> = shared
            .attaching_to(identifier)
            .map(|group| CompositionResult {
                elements: vec![group.element.clone()],
                position: group.attachment_point.position,
                position_priority: SHARED_ROOT_PRIORITY,
            })
            .collect();

        let tree_results = trees.into_iter().flat_map(move |tree| {
            let points: Vec<AttachmentPoint> =
                tree.attachment_points_for(identifier).cloned().collect();
            points
                .into_iter()
                .map(move |point| self.evaluate_root(&tree, &point, identifier, piggybag))
        });

        Ok(tree_results.chain(group_results))
    }

    /// Root attachments collected and sorted into display order.
    pub fn merged_root_attachments(
        &self,
        identifier: &Identifier,
        piggybag: &Piggybag,
    ) -> Result<Vec<CompositionResult>, ApiError> {
        Ok(merge_results(
            self.expand_root_attachments(identifier, piggybag)?,
        ))
    }

    /// Single-result form of the root attachment lookup.
    ///
    /// Every caller is served by [`expand_root_attachments`](Self::expand_root_attachments).
    pub fn alternate_element_list(
        &self,
        _identifier: &Identifier,
        _piggybag: &Piggybag,
    ) -> Result<CompositionResult, ApiError> {
        Err(ApiError::Unsupported(
            "single alternate element list; use expand_root_attachments",
        ))
    }

    /// Children of one logical parent.
    ///
    /// All resolved trees contribute in order. Any per-tree fault replaces the
    /// whole result with one error element.
    #[instrument(skip(self, piggybag), fields(provider = %self.provider_name, identifier = %identifier))]
    pub fn expand_children(
        &self,
        identifier: &Identifier,
        piggybag: &Piggybag,
    ) -> Result<Vec<Element>, ApiError> {
        let shared = self.shared_roots()?;

        let targets = match self.resolve_targets(identifier, piggybag, &shared) {
            Ok(targets) => targets,
            Err(e) => {
                let element = match e.tree_id() {
                    Some(tree_id) => self.diagnostics.contain(tree_id, &e),
                    None => self.diagnostics.contain_unowned(&identifier.to_string(), &e),
                };
                return Ok(vec![element]);
            }
        };

        let mut elements = Vec::new();
        for (tree, node_id) in &targets {
            match self.evaluate_children(tree, node_id, identifier, piggybag) {
                Ok(children) => elements.extend(children),
                Err(e) => return Ok(vec![self.diagnostics.contain(tree.tree_id(), &e)]),
            }
        }
        debug!(count = elements.len(), trees = targets.len(), "Expanded children");
        Ok(elements)
    }

    /// (tree, node id) pairs whose children make up the expansion of `identifier`.
    fn resolve_targets(
        &self,
        identifier: &Identifier,
        piggybag: &Piggybag,
        shared: &SharedRootSet,
    ) -> Result<Vec<(Arc<TreeDefinition>, String)>, TreeError> {
        match identifier {
            Identifier::PerspectiveRoot { id } => match shared.group(id) {
                Some(group) => Ok(group
                    .member_trees
                    .iter()
                    .map(|tree| (Arc::clone(tree), tree.root().id().to_string()))
                    .collect()),
                None => {
                    warn!(group_id = %id, "No shared root with this id");
                    Ok(Vec::new())
                }
            },
            Identifier::ContentRecord { entity_type, .. } => {
                let indexed = self
                    .trees
                    .iter()
                    .any(|tree| tree.indexes_entity_type(entity_type));
                if piggybag.tree_id().is_none() && !indexed {
                    return Ok(Vec::new());
                }
                Ok(vec![self.trees.resolve_record(identifier, piggybag)?])
            }
            Identifier::SimpleNode { .. }
            | Identifier::GeneratorNode { .. }
            | Identifier::GroupingNode { .. } => {
                let tree = self.trees.owning_tree(piggybag)?;
                let node = self.trees.node_for(tree, identifier, piggybag)?;
                Ok(vec![(Arc::clone(tree), node.id().to_string())])
            }
        }
    }

    fn evaluate_root(
        &self,
        tree: &TreeDefinition,
        point: &AttachmentPoint,
        identifier: &Identifier,
        piggybag: &Piggybag,
    ) -> CompositionResult {
        let root = tree.root();
        let context =
            DynamicContext::descending(&self.provider_name, piggybag, identifier, tree.tree_id(), root)
                .as_root();

        let elements = match tree.child_elements(root, identifier, &context) {
            Ok(elements) => elements,
            Err(e) => vec![self.diagnostics.contain(tree.tree_id(), &e)],
        };

        CompositionResult {
            elements,
            position: point.position,
            position_priority: point.priority,
        }
    }

    fn evaluate_children(
        &self,
        tree: &TreeDefinition,
        node_id: &str,
        identifier: &Identifier,
        piggybag: &Piggybag,
    ) -> Result<Vec<Element>, TreeError> {
        let node = tree.node(node_id).ok_or_else(|| {
            TreeError::out_of_sync(tree.tree_id(), format!("no node '{}'", node_id))
        })?;
        let context =
            DynamicContext::descending(&self.provider_name, piggybag, identifier, tree.tree_id(), node)
                .with_grouping_from(identifier);
        tree.child_elements(node, identifier, &context)
    }
}
