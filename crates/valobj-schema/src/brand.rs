use async_trait::async_trait;
use serde_json::Value;
use valobj_types::TypeTag;

use crate::error::SchemaResult;
use crate::schema::{IntoSchema, Schema, SchemaRef};

/// A schema bound to a type tag.
///
/// Branding never changes what a schema accepts; it only attaches the
/// nominal identity a value-object kind is discriminated by.
#[derive(Debug, Clone)]
pub struct Branded {
    inner: SchemaRef,
    tag: TypeTag,
}

impl Branded {
    /// The schema underneath the brand.
    pub fn inner(&self) -> &SchemaRef {
        &self.inner
    }
}

/// Brand `schema` with `tag`.
///
/// Idempotent: a schema that already carries a brand is returned unchanged,
/// whatever its tag.
pub fn brand(schema: impl IntoSchema, tag: TypeTag) -> SchemaRef {
    let schema = schema.into_schema();
    if schema.brand().is_some() {
        return schema;
    }
    tracing::trace!(%tag, "branding schema");
    std::sync::Arc::new(Branded { inner: schema, tag })
}

#[async_trait]
impl Schema for Branded {
    fn parse(&self, value: &Value) -> SchemaResult<Value> {
        self.inner.parse(value)
    }

    async fn parse_async(&self, value: &Value) -> SchemaResult<Value> {
        self.inner.parse_async(value).await
    }

    fn brand(&self) -> Option<&TypeTag> {
        Some(&self.tag)
    }

    fn is_async(&self) -> bool {
        self.inner.is_async()
    }

    fn accepts_missing(&self) -> bool {
        self.inner.accepts_missing()
    }
}
