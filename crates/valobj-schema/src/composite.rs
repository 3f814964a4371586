//! Structured schemas: sequences, keyed mappings, and optional fields.
//!
//! Composite schemas collect every issue of their children (prefixed with
//! the child's path) instead of stopping at the first one, but an
//! asynchronous step anywhere below aborts a synchronous parse immediately.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{invalid_type, Issue, IssueCode, Issues, PathSegment, SchemaError, SchemaResult};
use crate::schema::{IntoSchema, Schema, SchemaRef};

/// Accumulates child results for a composite parse.
#[derive(Default)]
struct Collector {
    issues: Vec<Issue>,
}

impl Collector {
    /// Record a child outcome. `Err` only for errors that must abort the parse.
    fn take(
        &mut self,
        result: SchemaResult<Value>,
        segment: PathSegment,
    ) -> SchemaResult<Option<Value>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err @ SchemaError::Invalid(_)) => {
                self.issues.extend(err.at(segment).issues().iter().cloned());
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    fn missing(&mut self, key: &str) {
        let mut issue = Issue::new(
            IssueCode::InvalidType {
                expected: "value",
                received: "undefined",
            },
            "Required",
        );
        issue.path.push(PathSegment::Key(key.to_string()));
        self.issues.push(issue);
    }

    fn finish(self, value: Value) -> SchemaResult<Value> {
        if self.issues.is_empty() {
            Ok(value)
        } else {
            Err(SchemaError::Invalid(Issues(self.issues)))
        }
    }
}

/// Ordered sequence of items sharing one schema.
#[derive(Debug, Clone)]
pub struct ArraySchema {
    item: SchemaRef,
    min: Option<usize>,
    max: Option<usize>,
}

/// Accept a sequence whose every element satisfies `item`.
pub fn array(item: impl IntoSchema) -> ArraySchema {
    ArraySchema {
        item: item.into_schema(),
        min: None,
        max: None,
    }
}

impl ArraySchema {
    /// Require at least `len` elements.
    pub fn min(mut self, len: usize) -> Self {
        self.min = Some(len);
        self
    }

    /// Allow at most `len` elements.
    pub fn max(mut self, len: usize) -> Self {
        self.max = Some(len);
        self
    }

    fn check_len(&self, len: usize) -> SchemaResult<()> {
        if let Some(min) = self.min {
            if len < min {
                return Err(SchemaError::issue(
                    IssueCode::TooSmall { minimum: min as f64 },
                    format!("Array must contain at least {min} element(s)"),
                ));
            }
        }
        if let Some(max) = self.max {
            if len > max {
                return Err(SchemaError::issue(
                    IssueCode::TooBig { maximum: max as f64 },
                    format!("Array must contain at most {max} element(s)"),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Schema for ArraySchema {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        let Value::Array(items) = value else {
            return Err(invalid_type("array", value));
        };
        self.check_len(items.len())?;
        let mut collector = Collector::default();
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let segment = PathSegment::Index(index);
            if let Some(parsed) = collector.take(self.item.parse(item), segment)? {
                out.push(parsed);
            }
        }
        collector.finish(Value::Array(out))
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        let Value::Array(items) = value else {
            return Err(invalid_type("array", value));
        };
        self.check_len(items.len())?;
        let mut collector = Collector::default();
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let result = self.item.parse_async(item).await;
            if let Some(parsed) = collector.take(result, PathSegment::Index(index))? {
                out.push(parsed);
            }
        }
        collector.finish(Value::Array(out))
    }

    fn is_async(&self) -> bool {
        self.item.is_async()
    }
}

/// Keyed mapping with a fixed set of fields. Unknown keys are stripped.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<(String, SchemaRef)>,
}

/// Start an empty object schema; add fields with [`ObjectSchema::field`].
pub fn object() -> ObjectSchema {
    ObjectSchema::default()
}

impl ObjectSchema {
    /// Add (or replace) a field.
    pub fn field(mut self, name: impl Into<String>, schema: impl IntoSchema) -> Self {
        let name = name.into();
        let schema = schema.into_schema();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = schema,
            None => self.fields.push((name, schema)),
        }
        self
    }

    /// Field names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

#[async_trait]
impl Schema for ObjectSchema {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        let Value::Object(input) = value else {
            return Err(invalid_type("object", value));
        };
        let mut collector = Collector::default();
        let mut out = Map::with_capacity(self.fields.len());
        for (name, schema) in &self.fields {
            match input.get(name) {
                None if schema.accepts_missing() => {}
                None => collector.missing(name),
                Some(item) => {
                    let segment = PathSegment::Key(name.clone());
                    if let Some(parsed) = collector.take(schema.parse(item), segment)? {
                        out.insert(name.clone(), parsed);
                    }
                }
            }
        }
        collector.finish(Value::Object(out))
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        let Value::Object(input) = value else {
            return Err(invalid_type("object", value));
        };
        let mut collector = Collector::default();
        let mut out = Map::with_capacity(self.fields.len());
        for (name, schema) in &self.fields {
            match input.get(name) {
                None if schema.accepts_missing() => {}
                None => collector.missing(name),
                Some(item) => {
                    let result = schema.parse_async(item).await;
                    if let Some(parsed) = collector.take(result, PathSegment::Key(name.clone()))? {
                        out.insert(name.clone(), parsed);
                    }
                }
            }
        }
        collector.finish(Value::Object(out))
    }

    fn is_async(&self) -> bool {
        self.fields.iter().any(|(_, schema)| schema.is_async())
    }
}

/// Keyed mapping with arbitrary keys and one value schema.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    value: SchemaRef,
}

/// Accept a mapping whose every value satisfies `value`.
pub fn record(value: impl IntoSchema) -> RecordSchema {
    RecordSchema {
        value: value.into_schema(),
    }
}

#[async_trait]
impl Schema for RecordSchema {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        let Value::Object(input) = value else {
            return Err(invalid_type("object", value));
        };
        let mut collector = Collector::default();
        let mut out = Map::with_capacity(input.len());
        for (key, item) in input {
            let segment = PathSegment::Key(key.clone());
            if let Some(parsed) = collector.take(self.value.parse(item), segment)? {
                out.insert(key.clone(), parsed);
            }
        }
        collector.finish(Value::Object(out))
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        let Value::Object(input) = value else {
            return Err(invalid_type("object", value));
        };
        let mut collector = Collector::default();
        let mut out = Map::with_capacity(input.len());
        for (key, item) in input {
            let result = self.value.parse_async(item).await;
            if let Some(parsed) = collector.take(result, PathSegment::Key(key.clone()))? {
                out.insert(key.clone(), parsed);
            }
        }
        collector.finish(Value::Object(out))
    }

    fn is_async(&self) -> bool {
        self.value.is_async()
    }
}

/// Wraps a schema so that `null` and absent object fields are accepted.
#[derive(Debug, Clone)]
pub struct OptionalSchema {
    inner: SchemaRef,
}

/// Accept `null`, a missing field, or a value satisfying `inner`.
pub fn optional(inner: impl IntoSchema) -> OptionalSchema {
    OptionalSchema {
        inner: inner.into_schema(),
    }
}

#[async_trait]
impl Schema for OptionalSchema {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            other => self.inner.parse(other),
        }
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            other => self.inner.parse_async(other).await,
        }
    }

    fn is_async(&self) -> bool {
        self.inner.is_async()
    }

    fn accepts_missing(&self) -> bool {
        true
    }
}
