//! Registries: tree definitions by identifier shape and lazily built shared roots.

pub mod shared_roots;
pub mod trees;

pub use shared_roots::{SharedRootGroup, SharedRootRegistry, SharedRootSet, SharedRootSource};
pub use trees::TreeRegistry;
