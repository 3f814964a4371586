//! Immutable, schema-validated value objects with flyweight identity.
//!
//! A value object is defined entirely by its value. Two instances of the
//! same kind built from deeply equal data are the *same* instance, so
//! comparing them is a pointer comparison:
//!
//! ```rust
//! use valobj_core::{Raw, Registry, RegistryConfig};
//! use valobj_schema::{number, object, string};
//!
//! let registry = Registry::new(RegistryConfig::default());
//! let name = registry.define("Name", string().min(1)).unwrap();
//! let point = registry
//!     .define("Point", object().field("x", number()).field("y", number()))
//!     .unwrap();
//!
//! let a = name.create("John Doe").unwrap();
//! let b = name.create("John Doe").unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.to_string(), "John Doe");
//!
//! let p = point.create(Raw::map([("x", 1), ("y", 2)])).unwrap();
//! let q = p.with(Raw::map([("y", 2)])).unwrap();
//! assert_eq!(p, q);
//! assert!(name.create("").unwrap_err().is_invalid());
//! ```
//!
//! Every instance is validated before it can exist, its value is frozen, and
//! schemas with asynchronous steps must be constructed through
//! [`Kind::create_async`].

pub mod config;
pub mod error;
pub mod kind;
pub mod normalize;
pub mod object;
pub mod registry;
pub mod role;

pub use config::RegistryConfig;
pub use error::{InvalidValue, ValueError, ValueResult};
pub use kind::Kind;
pub use normalize::{to_plain_value, Raw};
pub use object::{ValueObject, WeakValueObject};
pub use registry::{define_kind, Registry};
pub use role::Role;

// Re-export the building blocks callers need to declare kinds.
pub use valobj_schema;
pub use valobj_store::{CacheStats, Frozen, Retention};
pub use valobj_types::{TypeTag, ValueId};
