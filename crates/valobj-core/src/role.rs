//! Roles: specialized views over canonical value objects.
//!
//! A role adds domain methods to one kind without creating a second
//! instance. Constructing through a role resolves the very same cached
//! record as constructing through the kind; the role only wraps it.
//! Which role applies is decided by the type tag, never by runtime type
//! identity.
//!
//! ```rust
//! use valobj_core::{value_role, Registry, RegistryConfig, ValueObject};
//! use valobj_schema::string;
//!
//! value_role! {
//!     /// An e-mail address.
//!     pub struct Email: "Email";
//! }
//!
//! impl Email {
//!     pub fn domain(&self) -> &str {
//!         let address = self.value().as_str().unwrap_or_default();
//!         address.split_once('@').map_or("", |(_, domain)| domain)
//!     }
//! }
//!
//! let registry = Registry::new(RegistryConfig::default());
//! let kind = registry.define("Email", string()).unwrap();
//!
//! let email: Email = kind.create_as("ann@example.com").unwrap();
//! let plain = kind.create("ann@example.com").unwrap();
//! assert_eq!(email.domain(), "example.com");
//! assert!(ValueObject::ptr_eq(&email, &plain));
//! assert!(plain.as_role::<Email>().is_some());
//! ```

use crate::object::ValueObject;

/// A named view over value objects of one type tag.
pub trait Role: Sized {
    /// Type tag of the kind this role views.
    const TYPE: &'static str;

    /// Name used in diagnostics.
    const NAME: &'static str = Self::TYPE;

    fn from_object(object: ValueObject) -> Self;

    fn object(&self) -> &ValueObject;

    fn into_object(self) -> ValueObject;
}

/// Declare a role newtype over [`ValueObject`].
///
/// The generated type derefs to the canonical [`ValueObject`], compares by
/// identity, displays like its value, and converts into [`Raw`](crate::Raw)
/// so it can be nested in other values.
#[macro_export]
macro_rules! value_role {
    ($(#[$meta:meta])* $vis:vis struct $name:ident : $tag:literal;) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        $vis struct $name($crate::ValueObject);

        impl $crate::Role for $name {
            const TYPE: &'static str = $tag;
            const NAME: &'static str = stringify!($name);

            fn from_object(object: $crate::ValueObject) -> Self {
                Self(object)
            }

            fn object(&self) -> &$crate::ValueObject {
                &self.0
            }

            fn into_object(self) -> $crate::ValueObject {
                self.0
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::ValueObject;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::convert::From<$name> for $crate::Raw {
            fn from(role: $name) -> Self {
                $crate::Raw::Object(role.0)
            }
        }

        impl ::std::convert::From<&$name> for $crate::Raw {
            fn from(role: &$name) -> Self {
                $crate::Raw::Object(role.0.clone())
            }
        }

        impl ::std::convert::From<$name> for $crate::ValueObject {
            fn from(role: $name) -> Self {
                role.0
            }
        }
    };
}
