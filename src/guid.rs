//! Identifier newtypes for metadata elements and their types.
//!
//! Every element in the monitored repository has a stable GUID, and every
//! property value is stamped with the GUID of its type definition. Keeping
//! the two as distinct newtypes stops an element identifier being handed to
//! an API that expects a type identifier.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique, stable identifier of a metadata element.
///
/// # Examples
///
/// ```
/// use metawatch::ElementGuid;
///
/// let guid = ElementGuid::new();
/// assert!(!guid.is_nil());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementGuid(Uuid);

impl ElementGuid {
    /// Creates a new random element GUID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a GUID from its canonical string form.
    ///
    /// # Errors
    /// Returns the underlying parse error when the text is not a UUID.
    pub fn parse(text: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(text).map(Self)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns true if this is a nil (all zeros) GUID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for ElementGuid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ElementGuid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ElementGuid> for Uuid {
    fn from(guid: ElementGuid) -> Self {
        guid.0
    }
}

/// Identifier of a type definition in the repository's type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeGuid(Uuid);

impl TypeGuid {
    /// Creates a new random type GUID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TypeGuid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TypeGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TypeGuid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_guid_roundtrip() {
        let guid = ElementGuid::new();
        let parsed = ElementGuid::parse(&guid.to_string()).unwrap();
        assert_eq!(guid, parsed);
    }

    #[test]
    fn test_element_guid_parse_rejects_garbage() {
        assert!(ElementGuid::parse("not-a-guid").is_err());
    }

    #[test]
    fn test_guids_are_distinct_per_creation() {
        assert_ne!(ElementGuid::new(), ElementGuid::new());
        assert_ne!(TypeGuid::new(), TypeGuid::new());
    }

    #[test]
    fn test_element_guid_serde_transparent() {
        let guid = ElementGuid::new();
        let json = serde_json::to_string(&guid).unwrap();
        assert_eq!(json, format!("\"{guid}\""));
        let back: ElementGuid = serde_json::from_str(&json).unwrap();
        assert_eq!(guid, back);
    }
}
