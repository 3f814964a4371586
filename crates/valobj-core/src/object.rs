//! The canonical value-object record and its per-instance behavior.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use serde::{Serialize, Serializer};
use serde_json::Value;
use valobj_schema::SchemaRef;
use valobj_store::{Flyweight, Frozen};
use valobj_types::{TypeTag, ValueId};

use crate::error::ValueResult;
use crate::kind::{Kind, KindCore};
use crate::normalize::{to_plain_value, Raw};
use crate::role::Role;

struct Inner {
    kind: Arc<KindCore>,
    value: Frozen<Value>,
    id: ValueId,
}

/// An immutable, validated value of one kind.
///
/// `ValueObject` is a cheap handle; clones share one record. While the
/// flyweight cache is enabled, two handles of the same kind are identical
/// exactly when their plain values are deeply equal, so `==` compares
/// identity and never walks the value.
#[derive(Clone)]
pub struct ValueObject(Arc<Inner>);

/// Non-owning handle to a [`ValueObject`], held by weak-retention caches.
pub struct WeakValueObject(Weak<Inner>);

impl WeakValueObject {
    pub fn upgrade(&self) -> Option<ValueObject> {
        self.0.upgrade().map(ValueObject)
    }
}

impl ValueObject {
    pub(crate) fn from_parts(kind: Arc<KindCore>, value: Frozen<Value>, id: ValueId) -> Self {
        Self(Arc::new(Inner { kind, value, id }))
    }

    pub(crate) fn core(&self) -> &Arc<KindCore> {
        &self.0.kind
    }

    /// Whether two handles refer to the same instance.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn type_tag(&self) -> &TypeTag {
        self.0.kind.tag()
    }

    /// The branded schema of this instance's kind.
    pub fn schema(&self) -> &SchemaRef {
        self.0.kind.schema()
    }

    /// The frozen plain value.
    pub fn value(&self) -> &Value {
        &self.0.value
    }

    /// Shared handle to the frozen plain value.
    pub fn frozen(&self) -> &Frozen<Value> {
        &self.0.value
    }

    /// Content-addressed identifier of the plain value.
    pub fn id(&self) -> ValueId {
        self.0.id
    }

    /// Whether this instance was built by `kind` (nominal, not structural).
    pub fn is_instance_of(&self, kind: &Kind) -> bool {
        kind.owns(self)
    }

    /// View this instance through a role, if the role targets its type.
    pub fn as_role<R: Role>(&self) -> Option<R> {
        (self.type_tag().as_str() == R::TYPE).then(|| R::from_object(self.clone()))
    }

    /// Whether `other` denotes this very instance.
    ///
    /// `other` is normalized and looked up in this kind's cache partition.
    /// Because the cache holds one instance per value, finding `self` there
    /// is the same as deep equality. `other` is not run through the schema:
    /// it is compared against the stored, parsed form, so after a transform
    /// the input that built `self` may no longer equal it. While the cache is
    /// disabled nothing is ever found, so only the same handle compares equal
    /// via `==`, and `equals` returns `false`.
    pub fn equals(&self, other: impl Into<Raw>) -> bool {
        let plain = to_plain_value(other);
        self.0
            .kind
            .lookup(&plain)
            .is_some_and(|found| Self::ptr_eq(&found, self))
    }

    /// Derive a new value of the same kind.
    ///
    /// A mapping-shaped value is shallow-merged with `partial`; a sequence
    /// accepts a mapping of index to replacement element; any other shape
    /// is replaced outright. The result is validated and resolved through
    /// the cache. `self` is never modified.
    pub fn with(&self, partial: impl Into<Raw>) -> ValueResult<ValueObject> {
        let merged = merge(self.value(), to_plain_value(partial));
        let kind = &self.0.kind;
        let parsed = kind.validate(&merged, kind.tag().as_str())?;
        Ok(kind.resolve(parsed))
    }

    /// [`with`](Self::with) for kinds whose schema has asynchronous steps.
    pub async fn with_async(&self, partial: impl Into<Raw>) -> ValueResult<ValueObject> {
        let merged = merge(self.value(), to_plain_value(partial));
        let kind = Arc::clone(&self.0.kind);
        let parsed = kind.validate_async(&merged).await?;
        Ok(kind.resolve(parsed))
    }

    /// The plain value, owned.
    pub fn to_plain_value(&self) -> Value {
        (*self.0.value).clone()
    }

    /// The raw value projection.
    pub fn value_of(&self) -> &Value {
        self.value()
    }

    /// JSON text projection.
    ///
    /// Strings project to their own text; every other shape projects to
    /// its compact JSON encoding.
    pub fn to_json(&self) -> String {
        match self.value() {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn merge(current: &Value, partial: Value) -> Value {
    match (current, partial) {
        (Value::Object(base), Value::Object(patch)) => {
            let mut merged = base.clone();
            for (key, item) in patch {
                merged.insert(key, item);
            }
            Value::Object(merged)
        }
        (Value::Array(items), Value::Object(patch)) if is_index_patch(items.len(), &patch) => {
            let mut patched = items.clone();
            for (key, item) in patch {
                if let Some(index) = sequence_index(&key) {
                    patched[index] = item;
                }
            }
            Value::Array(patched)
        }
        (_, replacement) => replacement,
    }
}

fn is_index_patch(len: usize, patch: &serde_json::Map<String, Value>) -> bool {
    patch
        .keys()
        .all(|key| sequence_index(key).is_some_and(|index| index < len))
}

/// A key made only of ASCII digits, read as a sequence index.
fn sequence_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Natural string form: strings unquoted, sequences joined with `,`.
fn write_natural(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::String(s) => f.write_str(s),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write_natural(item, f)?;
            }
            Ok(())
        }
        other => write!(f, "{other}"),
    }
}

impl fmt::Display for ValueObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_natural(self.value(), f)
    }
}

impl fmt::Debug for ValueObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueObject")
            .field("type", &self.type_tag().as_str())
            .field("value", self.value())
            .finish()
    }
}

impl PartialEq for ValueObject {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl Eq for ValueObject {}

impl Hash for ValueObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl Serialize for ValueObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.value.serialize(serializer)
    }
}

impl Flyweight for ValueObject {
    type Weak = WeakValueObject;

    fn downgrade(&self) -> Self::Weak {
        WeakValueObject(Arc::downgrade(&self.0))
    }

    fn upgrade(weak: &Self::Weak) -> Option<Self> {
        weak.upgrade()
    }
}
