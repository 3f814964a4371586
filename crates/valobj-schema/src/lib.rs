//! Schema contract for value objects.
//!
//! The value-object runtime never interprets rules itself. It needs exactly
//! three things from a schema engine, captured by the [`Schema`] trait:
//!
//! 1. a synchronous `parse` that returns the (possibly transformed) value or
//!    a diagnostic, failing with [`SchemaError::AsyncStep`] when an async step
//!    is encountered;
//! 2. an asynchronous `parse_async` that awaits every step;
//! 3. a brand: the type tag a schema is bound to.
//!
//! A small built-in rule set is provided so kinds can be declared without an
//! external engine:
//!
//! ```rust
//! use valobj_schema::{number, object, string, Schema};
//! use serde_json::json;
//!
//! let address = object()
//!     .field("street", string().min(1))
//!     .field("number", number().int().min(1.0));
//! let parsed = address.parse(&json!({ "street": "Main", "number": 7 })).unwrap();
//! assert_eq!(parsed, json!({ "street": "Main", "number": 7 }));
//! ```

pub mod brand;
pub mod composite;
pub mod effects;
pub mod error;
pub mod primitives;
pub mod schema;

pub use brand::{brand, Branded};
pub use composite::{
    array, object, optional, record, ArraySchema, ObjectSchema, OptionalSchema, RecordSchema,
};
pub use effects::{
    refine, refine_async, refine_async_fn, transform, transform_async, transform_async_fn,
    AsyncRefinement, AsyncTransform, Refine, RefineAsync, Transform, TransformAsync,
};
pub use error::{AsyncStep, Issue, IssueCode, Issues, PathSegment, SchemaError, SchemaResult};
pub use primitives::{
    boolean, literal, number, string, BooleanSchema, LiteralSchema, NumberSchema, StringSchema,
};
pub use schema::{IntoSchema, Schema, SchemaRef};
