//! Value-object kinds: a type tag bound to a branded schema.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use serde_json::Value;
use valobj_schema::SchemaRef;
use valobj_store::{freeze, FlyweightCache};
use valobj_types::{normalize_numbers, TypeTag, ValueId};

use crate::error::{ValueError, ValueResult};
use crate::normalize::{to_plain_value, Raw};
use crate::object::ValueObject;
use crate::role::Role;

/// The cache every kind of one registry resolves through.
pub(crate) type ObjectCache = FlyweightCache<ValueObject>;

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Definition shared by a kind and all of its instances.
///
/// Instances hold this strongly; the cache is held weakly so a cache full of
/// instances does not keep itself alive through them.
pub(crate) struct KindCore {
    serial: u64,
    tag: TypeTag,
    schema: SchemaRef,
    cache: Weak<ObjectCache>,
}

impl KindCore {
    pub(crate) fn tag(&self) -> &TypeTag {
        &self.tag
    }

    pub(crate) fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Synchronous parse; `name` is what async diagnostics call the type.
    pub(crate) fn validate(&self, value: &Value, name: &str) -> ValueResult<Value> {
        self.schema
            .parse(value)
            .map_err(|e| ValueError::from_schema(e, name))
    }

    pub(crate) async fn validate_async(&self, value: &Value) -> ValueResult<Value> {
        self.schema
            .parse_async(value)
            .await
            .map_err(|e| ValueError::from_schema(e, self.tag.as_str()))
    }

    /// The single path by which instances come into existence.
    ///
    /// Integral floats are stored as integers, matching the cache key.
    /// Once the owning registry and every kind handle are gone there is no
    /// cache left; instances built after that are uncached, exactly as if the
    /// flyweight were disabled.
    pub(crate) fn resolve(self: &Arc<Self>, mut value: Value) -> ValueObject {
        normalize_numbers(&mut value);
        let make = |frozen, id| ValueObject::from_parts(Arc::clone(self), frozen, id);
        match self.cache.upgrade() {
            Some(cache) => cache.resolve(&self.tag, value, make),
            None => {
                let id = ValueId::of(&value);
                make(freeze(value), id)
            }
        }
    }

    pub(crate) fn lookup(&self, value: &Value) -> Option<ValueObject> {
        self.cache.upgrade()?.lookup(&self.tag, value)
    }
}

/// A value-object type: constructor, async constructor, and schema in one.
///
/// Kinds are produced by [`Registry::define`](crate::Registry::define). Each
/// call yields a kind with its own identity, so instances of two kinds never
/// pass each other's [`Kind::owns`] check even when their schemas and values
/// coincide.
#[derive(Clone)]
pub struct Kind {
    core: Arc<KindCore>,
    // Keeps the registry's cache alive for as long as the kind is usable.
    _cache: Arc<ObjectCache>,
}

impl Kind {
    pub(crate) fn new(tag: TypeTag, schema: SchemaRef, cache: &Arc<ObjectCache>) -> Self {
        let core = KindCore {
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
            tag,
            schema,
            cache: Arc::downgrade(cache),
        };
        Self {
            core: Arc::new(core),
            _cache: Arc::clone(cache),
        }
    }

    pub fn type_tag(&self) -> &TypeTag {
        &self.core.tag
    }

    /// The branded schema.
    pub fn schema(&self) -> &SchemaRef {
        &self.core.schema
    }

    /// The branded schema as a field schema for a composite definition.
    ///
    /// Composite schemas see plain values only, because construction
    /// normalizes nested value objects before parsing.
    pub fn as_schema(&self) -> SchemaRef {
        Arc::clone(&self.core.schema)
    }

    /// Whether `object` was built by this kind.
    pub fn owns(&self, object: &ValueObject) -> bool {
        Arc::ptr_eq(&self.core, object.core())
    }

    /// Construct synchronously: normalize, validate, resolve.
    ///
    /// Fails with [`ValueError::Invalid`] when the schema rejects the value,
    /// and with [`ValueError::RequiresAsync`] when the schema contains an
    /// asynchronous step.
    pub fn create(&self, raw: impl Into<Raw>) -> ValueResult<ValueObject> {
        self.create_named(raw.into(), self.core.tag.as_str())
    }

    /// Construct asynchronously, awaiting every schema step.
    ///
    /// The value stored is the schema's output, so transforms are applied.
    pub async fn create_async(&self, raw: impl Into<Raw>) -> ValueResult<ValueObject> {
        let plain = to_plain_value(raw);
        let parsed = self.core.validate_async(&plain).await?;
        Ok(self.core.resolve(parsed))
    }

    /// Construct synchronously and view the result through role `R`.
    pub fn create_as<R: Role>(&self, raw: impl Into<Raw>) -> ValueResult<R> {
        self.check_role::<R>()?;
        self.create_named(raw.into(), R::NAME).map(R::from_object)
    }

    /// Construct asynchronously and view the result through role `R`.
    pub async fn create_async_as<R: Role>(&self, raw: impl Into<Raw>) -> ValueResult<R> {
        self.check_role::<R>()?;
        self.create_async(raw).await.map(R::from_object)
    }

    fn create_named(&self, raw: Raw, name: &str) -> ValueResult<ValueObject> {
        let plain = to_plain_value(raw);
        let parsed = self.core.validate(&plain, name)?;
        Ok(self.core.resolve(parsed))
    }

    fn check_role<R: Role>(&self) -> ValueResult<()> {
        if self.core.tag.as_str() == R::TYPE {
            Ok(())
        } else {
            Err(ValueError::RoleMismatch {
                role: R::NAME,
                expected: R::TYPE,
                actual: self.core.tag.clone(),
            })
        }
    }
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for Kind {}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kind")
            .field("type", &self.core.tag.as_str())
            .field("serial", &self.core.serial)
            .field("schema", &self.core.schema)
            .finish()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.core.tag.as_str())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Raw, Registry, ValueError};
    use serde_json::json;
    use valobj_schema::{array, number, object, refine_async_fn, string, transform_async_fn};

    #[test]
    fn equal_values_share_one_instance() {
        let registry = Registry::default();
        let name = registry.define("Name", string()).unwrap();
        let a = name.create("John Doe").unwrap();
        let b = name.create("John Doe").unwrap();
        let c = name.create("Jane Doe").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        let stats = registry.cache_stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn rejected_values_never_enter_the_cache() {
        let registry = Registry::default();
        let name = registry.define("Name", string().min(1)).unwrap();
        let err = name.create("").unwrap_err();
        assert!(err.is_invalid());
        assert_eq!(err.issues().len(), 1);
        assert_eq!(registry.cache_stats().entries, 0);
    }

    #[test]
    fn ownership_is_nominal() {
        let registry = Registry::default();
        let street = registry.define("Street", string()).unwrap();
        let other = registry.define("OtherStreet", string()).unwrap();
        let s = street.create("Main").unwrap();
        let o = other.create("Main").unwrap();
        assert!(street.owns(&s));
        assert!(!street.owns(&o));
        assert!(!other.owns(&s));
        assert_ne!(s, o);
    }

    #[test]
    fn nested_objects_are_unwrapped() {
        let registry = Registry::default();
        let point = registry
            .define("Point", object().field("x", number()).field("y", number()))
            .unwrap();
        let line = registry
            .define("Line", array(point.as_schema()).min(2))
            .unwrap();
        let p = point.create(Raw::map([("x", 0), ("y", 0)])).unwrap();
        let q = point.create(json!({ "x": 1, "y": 1 })).unwrap();
        let from_objects = line.create(Raw::seq([p.clone(), q.clone()])).unwrap();
        let from_data = line
            .create(json!([{ "x": 0, "y": 0 }, { "x": 1, "y": 1 }]))
            .unwrap();
        assert_eq!(from_objects, from_data);
    }

    #[test]
    fn async_schema_refuses_sync_creation() {
        let registry = Registry::default();
        let checked = registry
            .define("Checked", refine_async_fn(string(), |_| async { true }))
            .unwrap();
        let err = checked.create("x").unwrap_err();
        assert!(err.requires_async());
        assert_eq!(
            err.to_string(),
            "Async refinement encountered during synchronous parse operation. \
             Use Checked::create_async() instead of Checked::create()"
        );
    }

    #[test]
    fn sync_failure_wins_over_async_step() {
        let registry = Registry::default();
        let checked = registry
            .define("Checked", refine_async_fn(string(), |_| async { true }))
            .unwrap();
        let err = checked.create(1).unwrap_err();
        assert!(err.is_invalid());
    }

    #[tokio::test]
    async fn async_creation_stores_the_parsed_value() {
        let registry = Registry::default();
        let upper = registry
            .define(
                "Upper",
                transform_async_fn(string(), |v| async move {
                    json!(v.as_str().unwrap_or_default().to_uppercase())
                }),
            )
            .unwrap();
        let a = upper.create_async("abc").await.unwrap();
        assert_eq!(a.value(), &json!("ABC"));
        let b = upper.create_async("ABC").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn async_refinement_failure_is_invalid() {
        let registry = Registry::default();
        let even = registry
            .define(
                "Even",
                refine_async_fn(number(), |v| async move {
                    v.as_i64().is_some_and(|n| n % 2 == 0)
                }),
            )
            .unwrap();
        assert!(even.create_async(4).await.is_ok());
        let err = even.create_async(3).await.unwrap_err();
        assert!(matches!(err, ValueError::Invalid(_)));
        assert_eq!(err.to_string(), "Invalid input");
    }

    #[test]
    fn display_and_debug_name_the_type() {
        let registry = Registry::default();
        let name = registry.define("Name", string()).unwrap();
        assert_eq!(name.to_string(), "Name");
        assert!(format!("{name:?}").contains("\"Name\""));
    }
}
