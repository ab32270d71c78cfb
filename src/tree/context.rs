//! Per-call evaluation context handed to element rules.

use crate::tree::node::TreeNode;
use crate::types::{Identifier, Piggybag};
use std::collections::BTreeMap;

/// Direction of a tree walk. Only descending expansion is resolved here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
}

/// Request-scoped state for one (identifier, tree) evaluation.
///
/// Borrows everything from the calling frame, so it cannot outlive the
/// resolution call that built it.
#[derive(Debug, Clone, Copy)]
pub struct DynamicContext<'a> {
    pub direction: Direction,
    pub provider_name: &'a str,
    pub piggybag: &'a Piggybag,
    pub current_identifier: &'a Identifier,
    pub current_node: &'a TreeNode,
    pub tree_id: &'a str,
    pub is_root: bool,
    pub grouping_values: Option<&'a BTreeMap<String, String>>,
    pub range_values: Option<&'a [i64]>,
}

impl<'a> DynamicContext<'a> {
    pub fn descending(
        provider_name: &'a str,
        piggybag: &'a Piggybag,
        current_identifier: &'a Identifier,
        tree_id: &'a str,
        current_node: &'a TreeNode,
    ) -> Self {
        Self {
            direction: Direction::Down,
            provider_name,
            piggybag,
            current_identifier,
            current_node,
            tree_id,
            is_root: false,
            grouping_values: None,
            range_values: None,
        }
    }

    pub fn as_root(mut self) -> Self {
        self.is_root = true;
        self
    }

    /// Thread grouping state from a grouping identifier, if it is one.
    pub fn with_grouping_from(mut self, identifier: &'a Identifier) -> Self {
        if let Identifier::GroupingNode {
            grouping_values,
            range_values,
            ..
        } = identifier
        {
            self.grouping_values = Some(grouping_values);
            self.range_values = range_values.as_deref();
        }
        self
    }
}
