//! Elements and composition results
//!
//! Elements are the opaque output units handed to the console renderer. The
//! engine never inspects them beyond ordering and forwarding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Priority given to shared-root group results so they sort above tree
/// results attached at the same position.
pub const SHARED_ROOT_PRIORITY: i32 = 10_000;

/// Metadata key carrying the tree id on error elements.
pub const META_TREE_ID: &str = "tree_id";

/// Metadata key carrying the failure message on error elements.
pub const META_MESSAGE: &str = "message";

/// Metadata key carrying the identifier on error elements no tree owns.
pub const META_IDENTIFIER: &str = "identifier";

/// Anchor point in the destination console tree.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Top,
    #[default]
    Bottom,
}

/// One navigation element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub is_error: bool,
}

impl Element {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: None,
            tooltip: None,
            metadata: BTreeMap::new(),
            is_error: false,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Placeholder shown in place of a tree that failed to evaluate.
    pub fn error(label: &str, tree_id: &str, message: &str) -> Self {
        Self::placeholder(label, tree_id, message).with_metadata(META_TREE_ID, tree_id)
    }

    /// Placeholder for a failure that could not be tied to any tree.
    pub fn unowned_error(label: &str, identifier: &str, message: &str) -> Self {
        Self::placeholder(label, identifier, message).with_metadata(META_IDENTIFIER, identifier)
    }

    fn placeholder(label: &str, scope: &str, message: &str) -> Self {
        let mut element = Element::new(format!("error:{}", scope), format!("{} ({})", label, scope))
            .with_icon("error")
            .with_tooltip(message)
            .with_metadata(META_MESSAGE, message);
        element.is_error = true;
        element
    }
}

/// Elements contributed by one (tree, attachment point) pair or one shared-root group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionResult {
    pub elements: Vec<Element>,
    pub position: Position,
    pub position_priority: i32,
}

impl CompositionResult {
    /// True when this result is an error placeholder.
    pub fn is_error(&self) -> bool {
        self.elements.len() == 1 && self.elements[0].is_error
    }
}

/// Merge results into display order: position first, then priority descending.
///
/// The sort is stable, so equal keys keep their declaration order.
pub fn merge_results<I>(results: I) -> Vec<CompositionResult>
where
    I: IntoIterator<Item = CompositionResult>,
{
    let mut merged: Vec<CompositionResult> = results.into_iter().collect();
    merged.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| b.position_priority.cmp(&a.position_priority))
    });
    merged
}
