//! Raw construction input and its reduction to plain values.
//!
//! Callers may build a value from plain data, from already-constructed value
//! objects of any kind, or from a mix of both. [`to_plain_value`] strips every
//! value-object wrapper so the schema and the cache only ever see plain data.

use serde_json::{Map, Value};

use crate::object::ValueObject;

/// Construction input.
#[derive(Clone, Debug)]
pub enum Raw {
    /// Plain data. A `Value` can never hold a value object, so it is
    /// already normalized.
    Plain(Value),
    /// A value object of any kind; contributes its plain value.
    Object(ValueObject),
    /// Ordered sequence of inputs.
    Seq(Vec<Raw>),
    /// Keyed mapping of inputs, in insertion order. A repeated key keeps
    /// its first position and its last value.
    Map(Vec<(String, Raw)>),
}

impl Raw {
    /// Build a mapping input.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Raw>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Build a sequence input.
    pub fn seq<V: Into<Raw>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::Seq(items.into_iter().map(Into::into).collect())
    }
}

/// Strip value-object wrappers from `input`, recursively.
pub fn to_plain_value(input: impl Into<Raw>) -> Value {
    normalize(input.into())
}

fn normalize(raw: Raw) -> Value {
    match raw {
        Raw::Plain(value) => value,
        Raw::Object(object) => object.to_plain_value(),
        Raw::Seq(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Raw::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, item) in entries {
                map.insert(key, normalize(item));
            }
            Value::Object(map)
        }
    }
}

impl From<Value> for Raw {
    fn from(value: Value) -> Self {
        Self::Plain(value)
    }
}

impl From<&Value> for Raw {
    fn from(value: &Value) -> Self {
        Self::Plain(value.clone())
    }
}

impl From<ValueObject> for Raw {
    fn from(object: ValueObject) -> Self {
        Self::Object(object)
    }
}

impl From<&ValueObject> for Raw {
    fn from(object: &ValueObject) -> Self {
        Self::Object(object.clone())
    }
}

impl<T: Into<Raw>> From<Vec<T>> for Raw {
    fn from(items: Vec<T>) -> Self {
        Self::seq(items)
    }
}

impl<T: Into<Raw>, const N: usize> From<[T; N]> for Raw {
    fn from(items: [T; N]) -> Self {
        Self::seq(items)
    }
}

impl<T: Into<Raw>> From<Option<T>> for Raw {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Plain(Value::Null), Into::into)
    }
}

macro_rules! impl_plain_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Raw {
                fn from(value: $t) -> Self {
                    Self::Plain(Value::from(value))
                }
            }
        )*
    };
}

impl_plain_from!(&str, String, bool, i32, i64, u32, u64, f64);
