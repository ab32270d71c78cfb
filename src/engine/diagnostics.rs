//! Fault containment: turn a per-tree failure into a reported error element.

use crate::element::Element;
use crate::error::TreeError;
use std::sync::Arc;
use tracing::error;

/// Component name attached to every reported failure.
pub const COMPONENT: &str = "canopy::engine";

/// Receives failures contained by the engine. Fire-and-forget.
pub trait FailureReporter: Send + Sync {
    fn log_message(&self, component: &str, message: &str);
    fn log_failure(&self, component: &str, failure: &TreeError);
}

/// Reports through `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn log_message(&self, component: &str, message: &str) {
        error!(component, "{}", message);
    }

    fn log_failure(&self, component: &str, failure: &TreeError) {
        error!(component, tree_id = failure.tree_id().unwrap_or("-"), error = %failure, "Tree evaluation failed");
    }
}

/// Supplies human-readable labels for synthetic elements.
pub trait LabelSource: Send + Sync {
    fn error_tree_label(&self) -> String;
}

pub const DEFAULT_ERROR_TREE_LABEL: &str = "Error in tree";

/// Labels fixed at construction, usually from configuration.
#[derive(Debug, Clone)]
pub struct StaticLabels {
    error_tree_label: String,
}

impl StaticLabels {
    pub fn new(error_tree_label: impl Into<String>) -> Self {
        Self {
            error_tree_label: error_tree_label.into(),
        }
    }
}

impl Default for StaticLabels {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_TREE_LABEL)
    }
}

impl LabelSource for StaticLabels {
    fn error_tree_label(&self) -> String {
        self.error_tree_label.clone()
    }
}

#[derive(Clone)]
pub(crate) struct Diagnostics {
    pub(crate) reporter: Arc<dyn FailureReporter>,
    pub(crate) labels: Arc<dyn LabelSource>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            reporter: Arc::new(TracingReporter),
            labels: Arc::new(StaticLabels::default()),
        }
    }
}

impl Diagnostics {
    /// Report `failure` and build the element shown in place of the failing tree.
    pub(crate) fn contain(&self, scope: &str, failure: &TreeError) -> Element {
        self.reporter.log_message(
            COMPONENT,
            &format!("Getting elements from the tree '{}' failed", scope),
        );
        self.reporter.log_failure(COMPONENT, failure);
        Element::error(&self.labels.error_tree_label(), scope, &failure.to_string())
    }

    /// Report a failure no tree owns, scoped to the identifier being resolved.
    pub(crate) fn contain_unowned(&self, identifier: &str, failure: &TreeError) -> Element {
        self.reporter.log_message(
            COMPONENT,
            &format!("Getting elements for '{}' failed: no owning tree", identifier),
        );
        self.reporter.log_failure(COMPONENT, failure);
        Element::unowned_error(&self.labels.error_tree_label(), identifier, &failure.to_string())
    }
}
