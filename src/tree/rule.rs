//! Element rules: the seam through which tree nodes produce elements.

use crate::element::Element;
use crate::error::RuleError;
use crate::tree::context::DynamicContext;
use crate::tree::node::TreeNode;
use crate::types::Identifier;
use std::fmt;

/// Produces the elements a tree node contributes for one identifier.
///
/// The returned sequence is finite and its order is significant.
pub trait ElementRule: Send + Sync {
    fn elements(
        &self,
        node: &TreeNode,
        identifier: &Identifier,
        context: &DynamicContext<'_>,
    ) -> Result<Vec<Element>, RuleError>;
}

impl<F> ElementRule for F
where
    F: Fn(&TreeNode, &Identifier, &DynamicContext<'_>) -> Result<Vec<Element>, RuleError>
        + Send
        + Sync,
{
    fn elements(
        &self,
        node: &TreeNode,
        identifier: &Identifier,
        context: &DynamicContext<'_>,
    ) -> Result<Vec<Element>, RuleError> {
        self(node, identifier, context)
    }
}

impl fmt::Debug for dyn ElementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ElementRule")
    }
}

/// One element per node, labelled statically.
///
/// Element ids are scoped by tree so the same node id in two trees stays distinct.
#[derive(Debug, Clone)]
pub struct LabelRule {
    label: String,
    icon: Option<String>,
}

impl LabelRule {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

impl ElementRule for LabelRule {
    fn elements(
        &self,
        node: &TreeNode,
        _identifier: &Identifier,
        context: &DynamicContext<'_>,
    ) -> Result<Vec<Element>, RuleError> {
        let mut element = Element::new(format!("{}/{}", context.tree_id, node.id()), &self.label);
        if let Some(icon) = &self.icon {
            element = element.with_icon(icon);
        }
        Ok(vec![element])
    }
}

/// A fixed list of elements, emitted as-is.
#[derive(Debug, Clone, Default)]
pub struct ListRule {
    elements: Vec<Element>,
}

impl ListRule {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }
}

impl ElementRule for ListRule {
    fn elements(
        &self,
        _node: &TreeNode,
        _identifier: &Identifier,
        _context: &DynamicContext<'_>,
    ) -> Result<Vec<Element>, RuleError> {
        Ok(self.elements.clone())
    }
}
