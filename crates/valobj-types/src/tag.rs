use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Nominal identifier of a value-object kind.
///
/// Two kinds built over structurally identical schemas are told apart by
/// their tags. The tag is also the partition key of the flyweight cache, so
/// it is cheap to clone (`Arc<str>`) and never changes once created.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeTag(Arc<str>);

impl TypeTag {
    /// Create a tag, rejecting the empty string.
    pub fn new(tag: impl AsRef<str>) -> Result<Self, TypeError> {
        let tag = tag.as_ref();
        if tag.is_empty() {
            return Err(TypeError::EmptyTag);
        }
        Ok(Self(Arc::from(tag)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.0)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TypeTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TypeTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TypeTag {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for TypeTag {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl TryFrom<String> for TypeTag {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for TypeTag {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tag_is_rejected() {
        assert_eq!(TypeTag::new(""), Err(TypeError::EmptyTag));
    }

    #[test]
    fn tag_compares_with_str() {
        let tag = TypeTag::new("Street").unwrap();
        assert_eq!(tag, "Street");
        assert_eq!(tag.as_str(), "Street");
        assert_eq!(tag.to_string(), "Street");
    }

    #[test]
    fn clones_share_storage() {
        let tag = TypeTag::new("Street").unwrap();
        let clone = tag.clone();
        assert!(Arc::ptr_eq(&tag.0, &clone.0));
    }

    #[test]
    fn serde_roundtrip_validates() {
        let tag = TypeTag::new("Email").unwrap();
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"Email\"");
        let back: TypeTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
        assert!(serde_json::from_str::<TypeTag>("\"\"").is_err());
    }
}
