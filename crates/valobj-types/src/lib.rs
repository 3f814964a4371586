//! Foundation types for value objects.
//!
//! Every other valobj crate depends on `valobj-types`. It defines how a
//! value-object kind is named and how a plain value is reduced to a stable,
//! order-insensitive identity.
//!
//! # Key Types
//!
//! - [`TypeTag`]: Nominal name of a value-object kind; the cache partition key
//! - [`ValueId`]: Content-addressed identifier of a canonicalized plain value
//! - [`canonicalize`]: Recursive key sorting and number normalization applied before hashing

pub mod canonical;
pub mod error;
pub mod tag;
pub mod value_id;

pub use canonical::{canonical_json, canonicalize, normalize_numbers};
pub use error::TypeError;
pub use tag::TypeTag;
pub use value_id::ValueId;

/// The plain-value data model shared by every crate in the workspace.
pub use serde_json::{Map, Value};
