use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};
use valobj_types::{TypeTag, ValueId};

use crate::frozen::{freeze, Frozen};

/// Something the flyweight cache can hold.
///
/// Clones must be cheap handles to one shared allocation; identity of that
/// allocation is what callers compare.
pub trait Flyweight: Clone + Send + Sync {
    /// Non-owning handle used by [`Retention::Weak`].
    type Weak: Send + Sync;

    fn downgrade(&self) -> Self::Weak;

    fn upgrade(weak: &Self::Weak) -> Option<Self>;
}

impl<T: Send + Sync + ?Sized> Flyweight for Arc<T> {
    type Weak = Weak<T>;

    fn downgrade(&self) -> Self::Weak {
        Arc::downgrade(self)
    }

    fn upgrade(weak: &Self::Weak) -> Option<Self> {
        weak.upgrade()
    }
}

/// How long cached instances are kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    /// Entries live as long as the cache. Nothing is ever evicted.
    #[default]
    Strong,
    /// The cache only observes instances; an entry dies with the last
    /// caller-held handle and is rebuilt on the next resolve.
    Weak,
}

enum Slot<T: Flyweight> {
    Strong(T),
    Weak(T::Weak),
}

impl<T: Flyweight> Slot<T> {
    fn new(instance: &T, retention: Retention) -> Self {
        match retention {
            Retention::Strong => Self::Strong(instance.clone()),
            Retention::Weak => Self::Weak(instance.downgrade()),
        }
    }

    fn live(&self) -> Option<T> {
        match self {
            Self::Strong(instance) => Some(instance.clone()),
            Self::Weak(weak) => T::upgrade(weak),
        }
    }
}

type Partition<T> = HashMap<ValueId, Slot<T>>;

/// Point-in-time counters of a [`FlyweightCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of type partitions created so far.
    pub partitions: usize,
    /// Live entries across all partitions.
    pub entries: usize,
    /// Resolutions answered from an existing entry.
    pub hits: u64,
    /// Resolutions that built and stored a new instance.
    pub misses: u64,
    /// Resolutions served while the cache was disabled.
    pub bypassed: u64,
}

/// Per-type flyweight cache.
///
/// Maps `TypeTag -> (ValueId -> instance)`. Partitions are created on first
/// use and live as long as the cache. All partitions sit behind one
/// `RwLock`: lookups take the read lock, and the insert path re-checks under
/// the write lock so two racing resolutions of the same value can never both
/// construct an instance.
pub struct FlyweightCache<T: Flyweight> {
    partitions: RwLock<HashMap<TypeTag, Partition<T>>>,
    enabled: AtomicBool,
    retention: Retention,
    hits: AtomicU64,
    misses: AtomicU64,
    bypassed: AtomicU64,
}

impl<T: Flyweight> FlyweightCache<T> {
    /// Create an empty, enabled cache.
    pub fn new(retention: Retention) -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
            enabled: AtomicBool::new(true),
            retention,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            bypassed: AtomicU64::new(0),
        }
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Switch flyweight resolution on or off for every partition.
    ///
    /// Existing entries are kept while disabled and served again once the
    /// cache is re-enabled.
    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            debug!(enabled, "flyweight cache toggled");
        }
    }

    /// Return the instance for `(tag, value)`, building it with `make` on a miss.
    ///
    /// `make` receives the frozen value and its id. It runs while the write
    /// lock is held and must not call back into this cache. When the cache is
    /// disabled, `make` runs on every call and nothing is stored.
    pub fn resolve<F>(&self, tag: &TypeTag, value: Value, make: F) -> T
    where
        F: FnOnce(Frozen<Value>, ValueId) -> T,
    {
        let id = ValueId::of(&value);

        if !self.is_enabled() {
            self.bypassed.fetch_add(1, Ordering::Relaxed);
            trace!(%tag, id = %id.short_hex(), "flyweight bypassed");
            return make(freeze(value), id);
        }

        if let Some(found) = self.get(tag, &id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(%tag, id = %id.short_hex(), "flyweight hit");
            return found;
        }

        let mut partitions = self.partitions.write().expect("lock poisoned");
        let partition = partitions.entry(tag.clone()).or_default();
        // Another resolver may have inserted between the read and write locks.
        if let Some(found) = partition.get(&id).and_then(Slot::live) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return found;
        }
        let instance = make(freeze(value), id);
        partition.insert(id, Slot::new(&instance, self.retention));
        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(%tag, id = %id.short_hex(), "flyweight miss");
        instance
    }

    /// Return the live instance for `(tag, value)` without inserting.
    ///
    /// Always `None` while the cache is disabled.
    pub fn lookup(&self, tag: &TypeTag, value: &Value) -> Option<T> {
        if !self.is_enabled() {
            return None;
        }
        self.get(tag, &ValueId::of(value))
    }

    fn get(&self, tag: &TypeTag, id: &ValueId) -> Option<T> {
        let partitions = self.partitions.read().expect("lock poisoned");
        partitions.get(tag)?.get(id)?.live()
    }

    /// Number of live entries across all partitions.
    pub fn len(&self) -> usize {
        let partitions = self.partitions.read().expect("lock poisoned");
        partitions
            .values()
            .map(|partition| partition.values().filter(|slot| slot.live().is_some()).count())
            .sum()
    }

    /// Returns `true` if no live entry exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live entries for one type tag.
    pub fn partition_len(&self, tag: &TypeTag) -> usize {
        let partitions = self.partitions.read().expect("lock poisoned");
        partitions.get(tag).map_or(0, |partition| {
            partition.values().filter(|slot| slot.live().is_some()).count()
        })
    }

    /// Drop slots whose instance is gone. Returns how many were removed.
    ///
    /// Only weak retention produces dead slots; with strong retention this
    /// is a no-op.
    pub fn purge(&self) -> usize {
        let mut partitions = self.partitions.write().expect("lock poisoned");
        let mut removed = 0;
        for partition in partitions.values_mut() {
            let before = partition.len();
            partition.retain(|_, slot| slot.live().is_some());
            removed += before - partition.len();
        }
        if removed > 0 {
            debug!(removed, "purged dead flyweight slots");
        }
        removed
    }

    /// Remove every entry and partition.
    pub fn clear(&self) {
        self.partitions.write().expect("lock poisoned").clear();
        debug!("flyweight cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let partitions = self.partitions.read().expect("lock poisoned").len();
        CacheStats {
            partitions,
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
        }
    }
}

impl<T: Flyweight> Default for FlyweightCache<T> {
    fn default() -> Self {
        Self::new(Retention::Strong)
    }
}

impl<T: Flyweight> fmt::Debug for FlyweightCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlyweightCache")
            .field("enabled", &self.is_enabled())
            .field("retention", &self.retention)
            .field("entry_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    type Entry = Arc<Frozen<Value>>;

    fn tag(s: &str) -> TypeTag {
        TypeTag::new(s).unwrap()
    }

    fn resolve(cache: &FlyweightCache<Entry>, t: &str, value: Value) -> Entry {
        cache.resolve(&tag(t), value, |frozen, _| Arc::new(frozen))
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    #[test]
    fn equal_values_resolve_to_one_instance() {
        let cache = FlyweightCache::default();
        let a = resolve(&cache, "Name", json!("John Doe"));
        let b = resolve(&cache, "Name", json!("John Doe"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn key_order_is_ignored() {
        let cache = FlyweightCache::default();
        let a = resolve(&cache, "Address", json!({ "city": "C", "street": "S" }));
        let b = resolve(&cache, "Address", json!({ "street": "S", "city": "C" }));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn first_insertion_order_is_kept_in_the_value() {
        let cache = FlyweightCache::default();
        let a = resolve(&cache, "Address", json!({ "street": "S", "city": "C" }));
        let _ = resolve(&cache, "Address", json!({ "city": "C", "street": "S" }));
        let keys: Vec<&String> = a.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["street", "city"]);
    }

    #[test]
    fn partitions_are_separate_per_tag() {
        let cache = FlyweightCache::default();
        let street = resolve(&cache, "Street", json!("Main"));
        let other = resolve(&cache, "OtherStreet", json!("Main"));
        assert!(!Arc::ptr_eq(&street, &other));
        assert_eq!(cache.partition_len(&tag("Street")), 1);
        assert_eq!(cache.partition_len(&tag("OtherStreet")), 1);
        assert_eq!(cache.stats().partitions, 2);
    }

    #[test]
    fn make_runs_once_per_value() {
        let cache = FlyweightCache::default();
        let mut calls = 0;
        for _ in 0..3 {
            cache.resolve(&tag("Name"), json!("x"), |frozen, _| {
                calls += 1;
                Arc::new(frozen)
            });
        }
        assert_eq!(calls, 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (2, 1));
    }

    #[test]
    fn make_receives_the_content_id() {
        let cache: FlyweightCache<Arc<ValueId>> = FlyweightCache::default();
        let id = cache.resolve(&tag("Name"), json!("x"), |_, id| Arc::new(id));
        assert_eq!(*id, ValueId::of(&json!("x")));
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    #[test]
    fn lookup_never_inserts() {
        let cache: FlyweightCache<Entry> = FlyweightCache::default();
        assert!(cache.lookup(&tag("Name"), &json!("x")).is_none());
        assert!(cache.is_empty());
        let a = resolve(&cache, "Name", json!("x"));
        let found = cache.lookup(&tag("Name"), &json!("x")).unwrap();
        assert!(Arc::ptr_eq(&a, &found));
    }

    // -----------------------------------------------------------------------
    // Disabled mode
    // -----------------------------------------------------------------------

    #[test]
    fn disabled_cache_builds_fresh_instances() {
        let cache = FlyweightCache::default();
        cache.set_enabled(false);
        let a = resolve(&cache, "Name", json!("x"));
        let b = resolve(&cache, "Name", json!("x"));
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(cache.is_empty());
        assert!(cache.lookup(&tag("Name"), &json!("x")).is_none());
        assert_eq!(cache.stats().bypassed, 2);
    }

    #[test]
    fn re_enabling_serves_earlier_entries() {
        let cache = FlyweightCache::default();
        let a = resolve(&cache, "Name", json!("x"));
        cache.set_enabled(false);
        let _ = resolve(&cache, "Name", json!("x"));
        cache.set_enabled(true);
        let b = resolve(&cache, "Name", json!("x"));
        assert!(Arc::ptr_eq(&a, &b));
    }

    // -----------------------------------------------------------------------
    // Retention
    // -----------------------------------------------------------------------

    #[test]
    fn weak_retention_drops_unreferenced_instances() {
        let cache = FlyweightCache::new(Retention::Weak);
        let a = resolve(&cache, "Name", json!("x"));
        assert_eq!(cache.len(), 1);
        let b = resolve(&cache, "Name", json!("x"));
        assert!(Arc::ptr_eq(&a, &b));

        drop(a);
        drop(b);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.purge(), 1);
        assert_eq!(cache.partition_len(&tag("Name")), 0);
    }

    #[test]
    fn weak_retention_rebuilds_dead_slot() {
        let cache = FlyweightCache::new(Retention::Weak);
        drop(resolve(&cache, "Name", json!("x")));
        let fresh = resolve(&cache, "Name", json!("x"));
        assert_eq!(**fresh, json!("x"));
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn strong_retention_keeps_everything() {
        let cache = FlyweightCache::new(Retention::Strong);
        drop(resolve(&cache, "Name", json!("x")));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge(), 0);
    }

    #[test]
    fn clear_removes_all() {
        let cache = FlyweightCache::default();
        resolve(&cache, "A", json!(1));
        resolve(&cache, "B", json!(2));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().partitions, 0);
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_resolution_yields_one_instance() {
        use std::thread;

        let cache: Arc<FlyweightCache<Entry>> = Arc::new(FlyweightCache::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || resolve(&cache, "Name", json!({ "first": "A", "last": "B" })))
            })
            .collect();
        let results: Vec<Entry> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        for w in results.windows(2) {
            assert!(Arc::ptr_eq(&w[0], &w[1]));
        }
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn debug_format() {
        let cache: FlyweightCache<Entry> = FlyweightCache::default();
        let debug = format!("{cache:?}");
        assert!(debug.contains("FlyweightCache"));
        assert!(debug.contains("entry_count"));
    }
}
