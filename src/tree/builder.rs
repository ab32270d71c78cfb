//! Tree definition builder: validates a declared shape into a strict rooted tree.

use crate::error::DefinitionError;
use crate::tree::attachment::AttachmentPoint;
use crate::tree::definition::TreeDefinition;
use crate::tree::node::TreeNode;
use crate::tree::rule::ElementRule;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, instrument};

struct NodeDraft {
    id: String,
    parent_id: Option<String>,
    entity_type: Option<String>,
    rule: Arc<dyn ElementRule>,
}

/// Builder for [`TreeDefinition`]
///
/// Nodes may be declared in any order; children keep the order in which they
/// were declared. `build` rejects duplicate ids, dangling parents and nodes that
/// cannot be reached from the root.
pub struct TreeDefinitionBuilder {
    tree_id: String,
    root: NodeDraft,
    nodes: Vec<NodeDraft>,
    attachment_points: Vec<AttachmentPoint>,
}

impl TreeDefinitionBuilder {
    pub fn new(
        tree_id: impl Into<String>,
        root_id: impl Into<String>,
        rule: Arc<dyn ElementRule>,
    ) -> Self {
        Self {
            tree_id: tree_id.into(),
            root: NodeDraft {
                id: root_id.into(),
                parent_id: None,
                entity_type: None,
                rule,
            },
            nodes: Vec::new(),
            attachment_points: Vec::new(),
        }
    }

    /// Declare a structural child node.
    pub fn child(
        self,
        parent_id: impl Into<String>,
        node_id: impl Into<String>,
        rule: Arc<dyn ElementRule>,
    ) -> Self {
        self.push(parent_id.into(), node_id.into(), None, rule)
    }

    /// Declare a data node that lists content records of `entity_type`.
    pub fn data_child(
        self,
        parent_id: impl Into<String>,
        node_id: impl Into<String>,
        entity_type: impl Into<String>,
        rule: Arc<dyn ElementRule>,
    ) -> Self {
        self.push(
            parent_id.into(),
            node_id.into(),
            Some(entity_type.into()),
            rule,
        )
    }

    pub fn attach(mut self, point: AttachmentPoint) -> Self {
        self.attachment_points.push(point);
        self
    }

    fn push(
        mut self,
        parent_id: String,
        id: String,
        entity_type: Option<String>,
        rule: Arc<dyn ElementRule>,
    ) -> Self {
        self.nodes.push(NodeDraft {
            id,
            parent_id: Some(parent_id),
            entity_type,
            rule,
        });
        self
    }

    #[instrument(skip(self), fields(tree_id = %self.tree_id, nodes = self.nodes.len() + 1))]
    pub fn build(self) -> Result<TreeDefinition, DefinitionError> {
        let tree_id = self.tree_id;

        // Step 1: unique ids
        let mut ids: HashSet<&str> = HashSet::new();
        ids.insert(self.root.id.as_str());
        for draft in &self.nodes {
            if !ids.insert(draft.id.as_str()) {
                return Err(DefinitionError::DuplicateNode {
                    tree_id,
                    node_id: draft.id.clone(),
                });
            }
        }

        // Step 2: parents exist; collect children in declaration order
        let mut children: HashMap<&str, Vec<String>> = HashMap::new();
        for draft in &self.nodes {
            let parent_id = draft.parent_id.as_deref().unwrap_or_default();
            if !ids.contains(parent_id) {
                return Err(DefinitionError::UnknownParent {
                    tree_id,
                    node_id: draft.id.clone(),
                    parent_id: parent_id.to_string(),
                });
            }
            children.entry(parent_id).or_default().push(draft.id.clone());
        }

        // Step 3: every node reachable from the root (single parent + reachable => no cycles)
        let mut reached: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([self.root.id.as_str()]);
        while let Some(current) = queue.pop_front() {
            if !reached.insert(current) {
                continue;
            }
            if let Some(kids) = children.get(current) {
                queue.extend(kids.iter().map(String::as_str));
            }
        }
        if let Some(orphan) = self.nodes.iter().find(|d| !reached.contains(d.id.as_str())) {
            return Err(DefinitionError::Unreachable {
                tree_id,
                node_id: orphan.id.clone(),
            });
        }

        // Step 4: materialize nodes and the entity-type reverse index
        let mut by_entity_type: HashMap<String, Vec<String>> = HashMap::new();
        for draft in &self.nodes {
            if let Some(entity_type) = &draft.entity_type {
                by_entity_type
                    .entry(entity_type.clone())
                    .or_default()
                    .push(draft.id.clone());
            }
        }

        let mut take_children = |id: &str| children.remove(id).unwrap_or_default();

        let root = TreeNode {
            children: take_children(&self.root.id),
            id: self.root.id.clone(),
            parent_id: None,
            entity_type: None,
            rule: Arc::clone(&self.root.rule),
        };

        let mut nodes = HashMap::with_capacity(self.nodes.len());
        for draft in &self.nodes {
            let node = TreeNode {
                children: take_children(&draft.id),
                id: draft.id.clone(),
                parent_id: draft.parent_id.clone(),
                entity_type: draft.entity_type.clone(),
                rule: Arc::clone(&draft.rule),
            };
            nodes.insert(draft.id.clone(), node);
        }

        debug!(
            entity_types = by_entity_type.len(),
            attachment_points = self.attachment_points.len(),
            "Tree definition built"
        );

        Ok(TreeDefinition {
            tree_id,
            root,
            nodes,
            attachment_points: self.attachment_points,
            by_entity_type,
        })
    }
}
