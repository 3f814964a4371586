use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// A deeply immutable, shared value.
///
/// `Frozen` hands out shared references only. It has no `DerefMut`, no
/// `get_mut`, and no interior mutability, so neither the top-level value
/// nor anything nested in it can be changed once frozen. Attempts are
/// rejected at compile time:
///
/// ```compile_fail
/// use valobj_store::freeze;
///
/// let address = freeze(serde_json::json!({ "street": "Some Street" }));
/// address["street"] = serde_json::json!("Other Street");
/// ```
///
/// ```compile_fail
/// use valobj_store::freeze;
///
/// let mut lines = freeze(vec![String::from("a")]);
/// lines.push(String::from("b"));
/// ```
pub struct Frozen<T: ?Sized>(Arc<T>);

/// Freeze `value`. Freezing takes ownership, so no mutable alias survives.
pub fn freeze<T>(value: T) -> Frozen<T> {
    Frozen(Arc::new(value))
}

impl<T: ?Sized> Frozen<T> {
    /// Whether two handles point at the same frozen allocation.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T: ?Sized> Deref for Frozen<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> AsRef<T> for Frozen<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> Clone for Frozen<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Frozen<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl<T: ?Sized + Eq> Eq for Frozen<T> {}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Frozen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Frozen").field(&&*self.0).finish()
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for Frozen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl<T: ?Sized + Serialize> Serialize for Frozen<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (*self.0).serialize(serializer)
    }
}
