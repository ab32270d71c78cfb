//! Shared roots: perspective groupings that fan one identifier out to several trees.
//!
//! Groups are built lazily, once per provider name, by a [`SharedRootSource`]
//! and kept for the lifetime of the registry.

use crate::element::Element;
use crate::error::{ApiError, DefinitionError};
use crate::tree::{AttachmentPoint, TreeDefinition};
use crate::types::Identifier;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// A virtual grouping shown as one folder that contains several trees.
#[derive(Debug, Clone)]
pub struct SharedRootGroup {
    pub group_id: String,
    pub label: String,
    pub member_trees: Vec<Arc<TreeDefinition>>,
    pub attachment_point: AttachmentPoint,
    /// Element presented where the group attaches
    pub element: Element,
}

/// Fully built, immutable set of shared-root groups for one provider.
#[derive(Debug, Default)]
pub struct SharedRootSet {
    groups: Vec<SharedRootGroup>,
    by_id: HashMap<String, usize>,
}

impl SharedRootSet {
    pub fn new(groups: Vec<SharedRootGroup>) -> Result<Self, DefinitionError> {
        let mut by_id = HashMap::with_capacity(groups.len());
        for (i, group) in groups.iter().enumerate() {
            if by_id.insert(group.group_id.clone(), i).is_some() {
                return Err(DefinitionError::DuplicateSharedRoot(group.group_id.clone()));
            }
        }
        Ok(Self { groups, by_id })
    }

    pub fn group(&self, group_id: &str) -> Option<&SharedRootGroup> {
        self.by_id.get(group_id).map(|&i| &self.groups[i])
    }

    pub fn groups(&self) -> &[SharedRootGroup] {
        &self.groups
    }

    /// Groups whose attachment point binds to `identifier`, in declaration order.
    pub fn attaching_to<'a>(
        &'a self,
        identifier: &'a Identifier,
    ) -> impl Iterator<Item = &'a SharedRootGroup> + 'a {
        self.groups
            .iter()
            .filter(move |group| group.attachment_point.matches(identifier))
    }
}

/// Builds the shared-root groups for a provider.
pub trait SharedRootSource: Send + Sync {
    fn load_groups(&self, provider_name: &str) -> Result<Vec<SharedRootGroup>, DefinitionError>;
}

type BuildLock = Arc<Mutex<()>>;

/// Lazily initialized shared-root registry
///
/// Published sets sit behind a read lock, so once a provider is built every
/// caller takes the shared read path. Each provider also owns a build lock
/// held for the whole build: concurrent first callers wait for the single
/// build and then read its result. A failed build publishes nothing and the
/// next call tries again.
pub struct SharedRootRegistry {
    source: Arc<dyn SharedRootSource>,
    published: RwLock<HashMap<String, Arc<SharedRootSet>>>,
    build_locks: Mutex<HashMap<String, BuildLock>>,
}

impl SharedRootRegistry {
    pub fn new(source: Arc<dyn SharedRootSource>) -> Self {
        Self {
            source,
            published: RwLock::new(HashMap::new()),
            build_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Registry with no groups for any provider.
    pub fn empty() -> Self {
        Self::new(Arc::new(NoSharedRoots))
    }

    fn build_lock(&self, provider_name: &str) -> BuildLock {
        let mut locks = self.build_locks.lock();
        Arc::clone(locks.entry(provider_name.to_string()).or_default())
    }

    /// Build the groups for `provider_name` unless already built.
    pub fn ensure_initialized(&self, provider_name: &str) -> Result<Arc<SharedRootSet>, ApiError> {
        if let Some(set) = self.get(provider_name) {
            return Ok(set);
        }

        let lock = self.build_lock(provider_name);
        let _building = lock.lock();
        if let Some(set) = self.get(provider_name) {
            return Ok(set);
        }

        info!(provider = provider_name, "Initializing shared roots");
        let built = self
            .source
            .load_groups(provider_name)
            .and_then(SharedRootSet::new)
            .map_err(|e| {
                error!(provider = provider_name, error = %e, "Shared root initialization failed");
                ApiError::Initialization {
                    provider: provider_name.to_string(),
                    message: e.to_string(),
                }
            })?;
        debug!(provider = provider_name, groups = built.groups.len(), "Shared roots ready");

        let set = Arc::new(built);
        self.published
            .write()
            .insert(provider_name.to_string(), Arc::clone(&set));
        Ok(set)
    }

    /// Published set for `provider_name`, if initialization already succeeded.
    pub fn get(&self, provider_name: &str) -> Option<Arc<SharedRootSet>> {
        self.published.read().get(provider_name).cloned()
    }
}

struct NoSharedRoots;

impl SharedRootSource for NoSharedRoots {
    fn load_groups(&self, _provider_name: &str) -> Result<Vec<SharedRootGroup>, DefinitionError> {
        Ok(Vec::new())
    }
}
