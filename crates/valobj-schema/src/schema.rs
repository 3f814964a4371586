use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use valobj_types::TypeTag;

use crate::error::SchemaResult;

/// A validation schema.
///
/// Implementations must be pure with respect to `parse`: the same input
/// always yields the same output or the same diagnostic. The trait is
/// object-safe and `Send + Sync` so schemas can be shared as [`SchemaRef`].
#[async_trait]
pub trait Schema: Send + Sync + fmt::Debug {
    /// Validate synchronously and return the parsed value.
    ///
    /// Fails with [`SchemaError::AsyncStep`](crate::SchemaError::AsyncStep)
    /// when an asynchronous refinement or transform is reached.
    fn parse(&self, value: &Value) -> SchemaResult<Value>;

    /// Validate, awaiting every asynchronous step.
    async fn parse_async(&self, value: &Value) -> SchemaResult<Value>;

    /// The type tag this schema is branded with, if any.
    fn brand(&self) -> Option<&TypeTag> {
        None
    }

    /// Whether parsing needs the asynchronous path anywhere in the tree.
    fn is_async(&self) -> bool {
        false
    }

    /// Whether an object field using this schema may be absent.
    fn accepts_missing(&self) -> bool {
        false
    }
}

/// Shared, immutable handle to a schema.
pub type SchemaRef = Arc<dyn Schema>;

/// Conversion into a [`SchemaRef`], accepted by every combinator.
pub trait IntoSchema {
    fn into_schema(self) -> SchemaRef;
}

impl<S: Schema + 'static> IntoSchema for S {
    fn into_schema(self) -> SchemaRef {
        Arc::new(self)
    }
}

impl IntoSchema for SchemaRef {
    fn into_schema(self) -> SchemaRef {
        self
    }
}

impl IntoSchema for &SchemaRef {
    fn into_schema(self) -> SchemaRef {
        Arc::clone(self)
    }
}
