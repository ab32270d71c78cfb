//! canopy: Composable Console-Tree Resolution
//!
//! Binds identifiers from a content graph to declarative tree definitions.
//! Trees attach to identifiers through attachment points, perspective groups
//! share one root across several trees, and a failing tree degrades to a
//! single error element instead of failing the whole resolution.

pub mod cli;
pub mod config;
pub mod definitions;
pub mod element;
pub mod engine;
pub mod error;
pub mod logging;
pub mod registry;
pub mod tree;
pub mod types;

pub use element::{merge_results, CompositionResult, Element, Position};
pub use engine::CompositionEngine;
pub use error::{ApiError, DefinitionError, RuleError, TreeError};
pub use types::{Identifier, Piggybag};
