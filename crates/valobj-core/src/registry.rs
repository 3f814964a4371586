//! Type registry: binds type tags to kinds and owns their flyweight cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;
use valobj_schema::{brand, IntoSchema};
use valobj_store::CacheStats;
use valobj_types::TypeTag;

use crate::config::RegistryConfig;
use crate::error::{ValueError, ValueResult};
use crate::kind::{Kind, ObjectCache};

/// A namespace of value-object kinds sharing one flyweight cache.
///
/// Tags are unique within a registry. Separate registries are fully
/// isolated: the same tag may be defined in each, and their instances never
/// share identity.
pub struct Registry {
    config: RegistryConfig,
    cache: Arc<ObjectCache>,
    kinds: RwLock<HashMap<TypeTag, Kind>>,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    pub fn new(config: RegistryConfig) -> Self {
        let cache = ObjectCache::new(config.retention);
        cache.set_enabled(config.flyweight);
        Self {
            config,
            cache: Arc::new(cache),
            kinds: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry used by [`define_kind`].
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::default)
    }

    /// Define a kind: brand `schema` with `tag` and bind the two.
    ///
    /// Fails with [`ValueError::DuplicateType`] if `tag` is already bound in
    /// this registry, and with [`ValueError::Type`] if `tag` is empty.
    pub fn define(&self, tag: impl AsRef<str>, schema: impl IntoSchema) -> ValueResult<Kind> {
        let tag = TypeTag::new(tag.as_ref())?;
        let mut kinds = self.kinds.write().expect("lock poisoned");
        if kinds.contains_key(&tag) {
            return Err(ValueError::DuplicateType(tag));
        }
        let schema = brand(schema, tag.clone());
        let kind = Kind::new(tag.clone(), schema, &self.cache);
        kinds.insert(tag.clone(), kind.clone());
        debug!(%tag, "defined value kind");
        Ok(kind)
    }

    /// The kind bound to `tag`, if any.
    pub fn kind(&self, tag: &str) -> Option<Kind> {
        self.kinds.read().expect("lock poisoned").get(tag).cloned()
    }

    /// All defined tags, sorted.
    pub fn kinds(&self) -> Vec<TypeTag> {
        let mut tags: Vec<TypeTag> = self
            .kinds
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        tags.sort();
        tags
    }

    /// Stop sharing instances: every construction builds a fresh one.
    pub fn disable_flyweight(&self) {
        self.cache.set_enabled(false);
    }

    pub fn enable_flyweight(&self) {
        self.cache.set_enabled(true);
    }

    pub fn flyweight_enabled(&self) -> bool {
        self.cache.is_enabled()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop cache slots whose instances have been released.
    pub fn purge(&self) -> usize {
        self.cache.purge()
    }

    /// The configuration this registry was created with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.kinds())
            .field("cache", &self.cache)
            .finish()
    }
}

/// Define a kind in the [global](Registry::global) registry.
pub fn define_kind(tag: impl AsRef<str>, schema: impl IntoSchema) -> ValueResult<Kind> {
    Registry::global().define(tag, schema)
}
