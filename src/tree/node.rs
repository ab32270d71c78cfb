//! Tree node: one position in a declared tree shape.

use crate::element::Element;
use crate::error::TreeError;
use crate::tree::context::DynamicContext;
use crate::tree::rule::ElementRule;
use crate::types::Identifier;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub(crate) id: String,
    pub(crate) parent_id: Option<String>,
    pub(crate) children: Vec<String>,
    pub(crate) entity_type: Option<String>,
    pub(crate) rule: Arc<dyn ElementRule>,
}

impl TreeNode {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Parent node id; None only for the root.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// Child node ids in declaration order.
    pub fn child_ids(&self) -> &[String] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Content-graph type this node lists, if it is a data node.
    pub fn entity_type(&self) -> Option<&str> {
        self.entity_type.as_deref()
    }

    /// Run this node's rule, tagging failures with the node and tree.
    pub fn elements(
        &self,
        identifier: &Identifier,
        context: &DynamicContext<'_>,
    ) -> Result<Vec<Element>, TreeError> {
        self.rule
            .elements(self, identifier, context)
            .map_err(|e| TreeError::RuleEvaluation {
                tree_id: context.tree_id.to_string(),
                node_id: self.id.clone(),
                message: e.to_string(),
            })
    }
}
