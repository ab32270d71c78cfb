//! Tree definition: an immutable, validated tree shape.

use crate::element::Element;
use crate::error::TreeError;
use crate::tree::attachment::AttachmentPoint;
use crate::tree::context::DynamicContext;
use crate::tree::node::TreeNode;
use crate::types::Identifier;
use std::collections::HashMap;

/// Complete tree definition
///
/// Built once by [`TreeDefinitionBuilder`](crate::tree::TreeDefinitionBuilder)
/// and shared read-only afterwards.
#[derive(Debug)]
pub struct TreeDefinition {
    pub(crate) tree_id: String,
    pub(crate) root: TreeNode,
    /// Non-root nodes by id
    pub(crate) nodes: HashMap<String, TreeNode>,
    pub(crate) attachment_points: Vec<AttachmentPoint>,
    /// Entity type -> data node ids, in declaration order
    pub(crate) by_entity_type: HashMap<String, Vec<String>>,
}

impl TreeDefinition {
    pub fn tree_id(&self) -> &str {
        &self.tree_id
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Look up a node (root included) by id.
    pub fn node(&self, node_id: &str) -> Option<&TreeNode> {
        if self.root.id == node_id {
            Some(&self.root)
        } else {
            self.nodes.get(node_id)
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len() + 1
    }

    /// Direct children of `node`, in declaration order.
    pub fn children<'a>(&'a self, node: &'a TreeNode) -> impl Iterator<Item = &'a TreeNode> + 'a {
        node.children.iter().filter_map(move |id| self.nodes.get(id))
    }

    /// Evaluate every direct child of `node` and concatenate their elements.
    pub fn child_elements(
        &self,
        node: &TreeNode,
        identifier: &Identifier,
        context: &DynamicContext<'_>,
    ) -> Result<Vec<Element>, TreeError> {
        let mut elements = Vec::new();
        for child in self.children(node) {
            elements.extend(child.elements(identifier, context)?);
        }
        Ok(elements)
    }

    pub fn attachment_points(&self) -> &[AttachmentPoint] {
        &self.attachment_points
    }

    /// Attachment points of this tree that bind to `identifier`.
    pub fn attachment_points_for<'a>(
        &'a self,
        identifier: &'a Identifier,
    ) -> impl Iterator<Item = &'a AttachmentPoint> + 'a {
        self.attachment_points
            .iter()
            .filter(move |point| point.matches(identifier))
    }

    pub fn is_attached_to(&self, identifier: &Identifier) -> bool {
        self.attachment_points_for(identifier).next().is_some()
    }

    pub fn indexes_entity_type(&self, entity_type: &str) -> bool {
        self.by_entity_type.contains_key(entity_type)
    }

    /// Data nodes listing records of `entity_type`, in declaration order.
    pub fn nodes_for_entity_type<'a>(
        &'a self,
        entity_type: &str,
    ) -> impl Iterator<Item = &'a TreeNode> + 'a {
        self.by_entity_type
            .get(entity_type)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.nodes.get(id))
    }

    /// Entity types covered by the reverse index.
    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.by_entity_type.keys().map(String::as_str)
    }
}
