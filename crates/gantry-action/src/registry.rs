//! Name to invocable resolution with a shared cache.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::ActionError;
use crate::provider::{ActionProvider, Invocable};

/// Resolves action names through an [`ActionProvider`] and caches hits.
///
/// Failed lookups are never cached, so an action that is not built yet
/// resolves as soon as it appears. Two racing resolutions of the same
/// uncached name may both reach the provider; the later insert wins.
pub struct ActionRegistry {
    provider: Arc<dyn ActionProvider>,
    cache: RwLock<HashMap<String, Arc<dyn Invocable>>>,
}

impl ActionRegistry {
    pub fn new(provider: Arc<dyn ActionProvider>) -> Self {
        Self {
            provider,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached invocable for `name`, or look it up and cache it.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Invocable>, ActionError> {
        if let Some(hit) = self.cached(name) {
            return Ok(hit);
        }

        // Provider lookup happens outside the cache lock.
        let invocable = self.provider.lookup(name)?;
        self.write_cache()
            .insert(name.to_string(), Arc::clone(&invocable));
        tracing::debug!(action = %name, "Cached action resolution");
        Ok(invocable)
    }

    /// Drop the cached entry for `name`. Returns whether one existed.
    pub fn invalidate(&self, name: &str) -> bool {
        let removed = self.write_cache().remove(name).is_some();
        if removed {
            tracing::info!(action = %name, "Invalidated cached action");
        }
        removed
    }

    /// Names the provider can see, whether or not they were ever resolved.
    pub fn list_available(&self) -> Result<BTreeSet<String>, ActionError> {
        self.provider.list()
    }

    /// The cached invocable for `name`, without consulting the provider.
    pub fn cached(&self, name: &str) -> Option<Arc<dyn Invocable>> {
        self.read_cache().get(name).map(Arc::clone)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.read_cache().contains_key(name)
    }

    pub fn cached_count(&self) -> usize {
        self.read_cache().len()
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Invocable>>> {
        self.cache.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Invocable>>> {
        self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("cached", &self.cached_count())
            .finish()
    }
}
