//! Tree Definitions
//!
//! Static, declarative tree shapes: nodes, the rules that turn a node into
//! elements, and the attachment points that bind a tree to live identifiers.
//! Definitions are validated once by the builder and are immutable afterwards.

pub mod attachment;
pub mod builder;
pub mod context;
pub mod definition;
pub mod node;
pub mod rule;

pub use attachment::{AttachmentPoint, AttachmentTarget};
pub use builder::TreeDefinitionBuilder;
pub use context::{Direction, DynamicContext};
pub use definition::TreeDefinition;
pub use node::TreeNode;
pub use rule::{ElementRule, LabelRule, ListRule};
