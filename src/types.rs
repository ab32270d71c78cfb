//! Core identifier types shared across the crate.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Caller-supplied key/value context forwarded through a resolution call.
pub type Piggybag = HashMap<String, String>;

/// Piggyback key naming the tree that owns a structural identifier.
pub const PIGGYBAG_TREE_ID: &str = "TreeId";

/// Piggyback key naming the tree node a content record was listed under.
pub const PIGGYBAG_PARENT_NODE_ID: &str = "ParentNodeId";

/// Typed accessors for the piggyback keys the resolver reads.
pub trait PiggybagExt {
    fn tree_id(&self) -> Option<&str>;
    fn parent_node_id(&self) -> Option<&str>;
}

impl PiggybagExt for Piggybag {
    fn tree_id(&self) -> Option<&str> {
        self.get(PIGGYBAG_TREE_ID).map(String::as_str)
    }

    fn parent_node_id(&self) -> Option<&str> {
        self.get(PIGGYBAG_PARENT_NODE_ID).map(String::as_str)
    }
}

/// What is being expanded in the composed console tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identifier {
    /// Named top-level grouping that fans out to shared-root member trees
    PerspectiveRoot { id: String },
    /// Plain tree-local node
    SimpleNode { node_id: String },
    /// Tree-local node whose children are generated on demand
    GeneratorNode { node_id: String },
    /// Tree-local node bucketed by field values and optional ranges
    GroupingNode {
        node_id: String,
        #[serde(default)]
        grouping_values: BTreeMap<String, String>,
        #[serde(default)]
        range_values: Option<Vec<i64>>,
    },
    /// Live record in the external content graph
    ContentRecord { entity_type: String, key: String },
}

impl Identifier {
    pub fn perspective(id: impl Into<String>) -> Self {
        Identifier::PerspectiveRoot { id: id.into() }
    }

    pub fn simple(node_id: impl Into<String>) -> Self {
        Identifier::SimpleNode {
            node_id: node_id.into(),
        }
    }

    pub fn generator(node_id: impl Into<String>) -> Self {
        Identifier::GeneratorNode {
            node_id: node_id.into(),
        }
    }

    pub fn record(entity_type: impl Into<String>, key: impl Into<String>) -> Self {
        Identifier::ContentRecord {
            entity_type: entity_type.into(),
            key: key.into(),
        }
    }

    /// True for identifiers that may legitimately map to no tree at all.
    pub fn is_root_like(&self) -> bool {
        matches!(
            self,
            Identifier::PerspectiveRoot { .. } | Identifier::ContentRecord { .. }
        )
    }

    /// Tree-local node id carried by structural identifiers.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Identifier::SimpleNode { node_id }
            | Identifier::GeneratorNode { node_id }
            | Identifier::GroupingNode { node_id, .. } => Some(node_id),
            Identifier::PerspectiveRoot { .. } | Identifier::ContentRecord { .. } => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::PerspectiveRoot { id } => write!(f, "perspective:{}", id),
            Identifier::SimpleNode { node_id } => write!(f, "simple:{}", node_id),
            Identifier::GeneratorNode { node_id } => write!(f, "generator:{}", node_id),
            Identifier::GroupingNode {
                node_id,
                grouping_values,
                range_values,
            } => {
                write!(f, "grouping:{}", node_id)?;
                if !grouping_values.is_empty() || range_values.is_some() {
                    let pairs: Vec<String> = grouping_values
                        .iter()
                        .map(|(k, v)| format!("{}={}", k, v))
                        .collect();
                    write!(f, ";{}", pairs.join(","))?;
                }
                if let Some(ranges) = range_values {
                    let ranges: Vec<String> = ranges.iter().map(|r| r.to_string()).collect();
                    write!(f, ";{}", ranges.join(","))?;
                }
                Ok(())
            }
            Identifier::ContentRecord { entity_type, key } => {
                write!(f, "record:{}:{}", entity_type, key)
            }
        }
    }
}

impl FromStr for Identifier {
    type Err = ApiError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ApiError::InvalidIdentifier {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (kind, rest) = input
            .split_once(':')
            .ok_or_else(|| invalid("expected '<kind>:<value>'"))?;
        if rest.is_empty() {
            return Err(invalid("missing value"));
        }

        match kind {
            "perspective" => Ok(Identifier::perspective(rest)),
            "simple" => Ok(Identifier::simple(rest)),
            "generator" => Ok(Identifier::generator(rest)),
            "grouping" => {
                let mut parts = rest.split(';');
                let node_id = parts.next().unwrap_or_default();
                if node_id.is_empty() {
                    return Err(invalid("missing grouping node id"));
                }

                let mut grouping_values = BTreeMap::new();
                if let Some(pairs) = parts.next() {
                    for pair in pairs.split(',').filter(|p| !p.is_empty()) {
                        let (k, v) = pair
                            .split_once('=')
                            .ok_or_else(|| invalid("grouping values must be 'field=value'"))?;
                        grouping_values.insert(k.to_string(), v.to_string());
                    }
                }

                let range_values = match parts.next() {
                    Some(ranges) => Some(
                        ranges
                            .split(',')
                            .filter(|r| !r.is_empty())
                            .map(|r| r.parse::<i64>())
                            .collect::<Result<Vec<_>, _>>()
                            .map_err(|_| invalid("range values must be integers"))?,
                    ),
                    None => None,
                };

                if parts.next().is_some() {
                    return Err(invalid("too many ';' sections"));
                }

                Ok(Identifier::GroupingNode {
                    node_id: node_id.to_string(),
                    grouping_values,
                    range_values,
                })
            }
            "record" => {
                let (entity_type, key) = rest
                    .split_once(':')
                    .filter(|(t, k)| !t.is_empty() && !k.is_empty())
                    .ok_or_else(|| invalid("expected 'record:<entity_type>:<key>'"))?;
                Ok(Identifier::record(entity_type, key))
            }
            _ => Err(invalid("unknown identifier kind")),
        }
    }
}
