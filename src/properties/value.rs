//! Self-describing typed property values.
//!
//! Every change event carries its subject's properties as a tree of
//! `PropertyValue` nodes. Each node is stamped with the identifier of the
//! type definition that produced it, so a consumer can interpret the payload
//! without access to the repository's type system. Values have value
//! semantics throughout: cloning yields a fully independent tree and
//! equality is deep structural equality.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PropertyError;
use crate::guid::TypeGuid;

/// Identifier pair for the type definition behind a property value.
///
/// Two structurally identical trees with different type identifiers are
/// unequal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeIdentifier {
    /// GUID of the type definition.
    pub guid: TypeGuid,
    /// Human-readable name of the type definition.
    pub name: String,
}

impl TypeIdentifier {
    /// Creates a type identifier from its two parts.
    #[must_use]
    pub fn new(guid: TypeGuid, name: impl Into<String>) -> Self {
        Self {
            guid,
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The five categories a property value can belong to.
///
/// A node's payload always matches its category; the enum representation of
/// [`PropertyValue`] makes a mismatch unrepresentable.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCategory {
    Primitive,
    Enum,
    Struct,
    Array,
    Map,
}

impl fmt::Display for PropertyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Primitive => "primitive",
            Self::Enum => "enum",
            Self::Struct => "struct",
            Self::Array => "array",
            Self::Map => "map",
        };
        write!(f, "{text}")
    }
}

/// Payload of a primitive-category property value.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PrimitiveValue {
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(DateTime<Utc>),
}

impl PrimitiveValue {
    pub const fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean(_))
    }

    pub const fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }

    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    pub const fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Date(_) => "date",
        }
    }
}

impl Hash for PrimitiveValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Boolean(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            // Normalize -0.0 so values that compare equal hash equal.
            Self::Float(v) => {
                let v = if *v == 0.0 { 0.0 } else { *v };
                v.to_bits().hash(state);
            }
            Self::String(v) => v.hash(state),
            Self::Date(v) => v.hash(state),
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Date(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

impl From<bool> for PrimitiveValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for PrimitiveValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for PrimitiveValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for PrimitiveValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for PrimitiveValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<DateTime<Utc>> for PrimitiveValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Date(v)
    }
}

/// Insertion-ordered mapping from unique field name to property value.
///
/// Backs both the fields of a Struct value and the entries of a Map value.
/// Field order is the declaration order of the originating type definition
/// and is significant: the diff engine's output contract depends on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    entries: Vec<(String, PropertyValue)>,
}

impl FieldMap {
    /// Creates an empty field map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts a field, replacing any existing value in place.
    ///
    /// A replaced field keeps its original position; a new field is appended.
    /// Returns the previous value when the name was already present.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) -> Option<PropertyValue> {
        let name = name.into();
        for (existing, slot) in &mut self.entries {
            if *existing == name {
                return Some(std::mem::replace(slot, value));
            }
        }
        self.entries.push((name, value));
        None
    }

    /// Returns the value of a field, or None when the name is absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value of a field.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut PropertyValue> {
        self.entries
            .iter_mut()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Returns the value of a field.
    ///
    /// # Errors
    /// `PropertyError::FieldNotFound` when the name is absent.
    pub fn field(&self, name: &str) -> Result<&PropertyValue, PropertyError> {
        self.get(name).ok_or_else(|| PropertyError::FieldNotFound {
            name: name.to_string(),
        })
    }

    /// Returns true when the field is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates field names in insertion order.
    ///
    /// The iterator is finite and a fresh call restarts from the first name.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no fields are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Hash for FieldMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.len().hash(state);
        for (name, value) in &self.entries {
            name.hash(state);
            value.hash(state);
        }
    }
}

impl FromIterator<(String, PropertyValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// A node in a property tree: a tagged union over the five categories.
///
/// Every node carries the identifier of its type definition plus a
/// category-specific payload. Category and payload are fixed at
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum PropertyValue {
    /// A single primitive value.
    Primitive {
        type_id: TypeIdentifier,
        value: PrimitiveValue,
    },

    /// A symbol from an enumerated type.
    Enum {
        type_id: TypeIdentifier,
        symbol: String,
        ordinal: i32,
    },

    /// A complex structure of named fields, declaration order significant.
    Struct {
        type_id: TypeIdentifier,
        fields: FieldMap,
    },

    /// An ordered collection of values.
    Array {
        type_id: TypeIdentifier,
        elements: Vec<PropertyValue>,
    },

    /// A keyed collection of values, insertion order preserved.
    Map {
        type_id: TypeIdentifier,
        entries: FieldMap,
    },
}

impl PropertyValue {
    /// Constructs a primitive value.
    #[must_use]
    pub fn primitive(type_id: TypeIdentifier, value: impl Into<PrimitiveValue>) -> Self {
        Self::Primitive {
            type_id,
            value: value.into(),
        }
    }

    /// Constructs an enum value.
    #[must_use]
    pub fn enumeration(type_id: TypeIdentifier, symbol: impl Into<String>, ordinal: i32) -> Self {
        Self::Enum {
            type_id,
            symbol: symbol.into(),
            ordinal,
        }
    }

    /// Constructs a struct value from its fields.
    #[must_use]
    pub fn structure(type_id: TypeIdentifier, fields: FieldMap) -> Self {
        Self::Struct { type_id, fields }
    }

    /// Constructs an array value.
    #[must_use]
    pub fn array(type_id: TypeIdentifier, elements: Vec<PropertyValue>) -> Self {
        Self::Array { type_id, elements }
    }

    /// Constructs a map value.
    #[must_use]
    pub fn map(type_id: TypeIdentifier, entries: FieldMap) -> Self {
        Self::Map { type_id, entries }
    }

    /// The category of this node.
    #[must_use]
    pub const fn category(&self) -> PropertyCategory {
        match self {
            Self::Primitive { .. } => PropertyCategory::Primitive,
            Self::Enum { .. } => PropertyCategory::Enum,
            Self::Struct { .. } => PropertyCategory::Struct,
            Self::Array { .. } => PropertyCategory::Array,
            Self::Map { .. } => PropertyCategory::Map,
        }
    }

    /// The type identifier stamped on this node.
    #[must_use]
    pub const fn type_id(&self) -> &TypeIdentifier {
        match self {
            Self::Primitive { type_id, .. }
            | Self::Enum { type_id, .. }
            | Self::Struct { type_id, .. }
            | Self::Array { type_id, .. }
            | Self::Map { type_id, .. } => type_id,
        }
    }

    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive { .. })
    }

    pub const fn is_enum(&self) -> bool {
        matches!(self, Self::Enum { .. })
    }

    pub const fn is_struct(&self) -> bool {
        matches!(self, Self::Struct { .. })
    }

    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array { .. })
    }

    pub const fn is_map(&self) -> bool {
        matches!(self, Self::Map { .. })
    }

    pub const fn as_primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            Self::Primitive { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_enum_symbol(&self) -> Option<&str> {
        match self {
            Self::Enum { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    /// The fields of a Struct node.
    pub const fn as_struct_fields(&self) -> Option<&FieldMap> {
        match self {
            Self::Struct { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Mutable fields of a Struct node.
    pub fn as_struct_fields_mut(&mut self) -> Option<&mut FieldMap> {
        match self {
            Self::Struct { fields, .. } => Some(fields),
            _ => None,
        }
    }

    pub fn as_array_elements(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::Array { elements, .. } => Some(elements),
            _ => None,
        }
    }

    pub const fn as_map_entries(&self) -> Option<&FieldMap> {
        match self {
            Self::Map { entries, .. } => Some(entries),
            _ => None,
        }
    }
}

impl Hash for PropertyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.category().hash(state);
        self.type_id().hash(state);
        match self {
            Self::Primitive { value, .. } => value.hash(state),
            Self::Enum {
                symbol, ordinal, ..
            } => {
                symbol.hash(state);
                ordinal.hash(state);
            }
            Self::Struct { fields, .. } => fields.hash(state),
            Self::Array { elements, .. } => elements.hash(state),
            Self::Map { entries, .. } => entries.hash(state),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive { value, .. } => write!(f, "{value}"),
            Self::Enum { symbol, .. } => write!(f, "{symbol}"),
            Self::Struct { fields, .. } | Self::Map { entries: fields, .. } => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
            Self::Array { elements, .. } => {
                write!(f, "[")?;
                for (i, value) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_type() -> TypeIdentifier {
        TypeIdentifier::new(TypeGuid::from_uuid(uuid::Uuid::from_u128(1)), "string")
    }

    fn struct_type() -> TypeIdentifier {
        TypeIdentifier::new(TypeGuid::from_uuid(uuid::Uuid::from_u128(2)), "AssetProperties")
    }

    fn prim(text: &str) -> PropertyValue {
        PropertyValue::primitive(string_type(), text)
    }

    #[test]
    fn test_category_matches_payload() {
        let value = prim("a");
        assert_eq!(value.category(), PropertyCategory::Primitive);
        assert!(value.is_primitive());
        assert!(value.as_struct_fields().is_none());

        let mut fields = FieldMap::new();
        fields.insert("name", prim("report.csv"));
        let value = PropertyValue::structure(struct_type(), fields);
        assert_eq!(value.category(), PropertyCategory::Struct);
        assert!(value.as_struct_fields().is_some());
    }

    #[test]
    fn test_field_map_preserves_insertion_order() {
        let mut fields = FieldMap::new();
        fields.insert("qualifiedName", prim("a"));
        fields.insert("displayName", prim("b"));
        fields.insert("owner", prim("c"));

        let names: Vec<&str> = fields.names().collect();
        assert_eq!(names, vec!["qualifiedName", "displayName", "owner"]);

        // Restartable: a second pass sees the same sequence.
        let again: Vec<&str> = fields.names().collect();
        assert_eq!(names, again);
    }

    #[test]
    fn test_field_map_insert_replaces_in_place() {
        let mut fields = FieldMap::new();
        fields.insert("a", prim("1"));
        fields.insert("b", prim("2"));

        let previous = fields.insert("a", prim("3"));
        assert_eq!(previous, Some(prim("1")));
        assert_eq!(fields.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(fields.get("a"), Some(&prim("3")));
    }

    #[test]
    fn test_field_lookup_not_found() {
        let fields = FieldMap::new();
        let err = fields.field("missing").unwrap_err();
        assert_eq!(
            err,
            crate::error::PropertyError::FieldNotFound {
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_clone_is_a_deep_copy() {
        let mut fields = FieldMap::new();
        fields.insert("name", prim("original"));
        let source = PropertyValue::structure(struct_type(), fields);

        let mut copy = source.clone();
        assert_eq!(copy, source);

        copy.as_struct_fields_mut()
            .unwrap()
            .insert("name", prim("mutated"));

        assert_ne!(copy, source);
        assert_eq!(
            source.as_struct_fields().unwrap().get("name"),
            Some(&prim("original"))
        );
    }

    #[test]
    fn test_equality_requires_matching_type_identifiers() {
        let a = PropertyValue::primitive(string_type(), "x");
        let other_type =
            TypeIdentifier::new(TypeGuid::from_uuid(uuid::Uuid::from_u128(9)), "string");
        let b = PropertyValue::primitive(other_type, "x");
        assert_ne!(a, b);
    }

    #[test]
    fn test_equality_is_recursive() {
        let mut inner_a = FieldMap::new();
        inner_a.insert("depth", PropertyValue::primitive(string_type(), 2i64));
        let mut outer_a = FieldMap::new();
        outer_a.insert("nested", PropertyValue::structure(struct_type(), inner_a));

        let mut inner_b = FieldMap::new();
        inner_b.insert("depth", PropertyValue::primitive(string_type(), 2i64));
        let mut outer_b = FieldMap::new();
        outer_b.insert("nested", PropertyValue::structure(struct_type(), inner_b));

        assert_eq!(
            PropertyValue::structure(struct_type(), outer_a),
            PropertyValue::structure(struct_type(), outer_b)
        );
    }

    #[test]
    fn test_hash_consistent_with_equality() {
        use std::collections::hash_map::DefaultHasher;

        fn hash_of(value: &PropertyValue) -> u64 {
            let mut hasher = DefaultHasher::new();
            value.hash(&mut hasher);
            hasher.finish()
        }

        let a = prim("same");
        let b = prim("same");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let zero = PropertyValue::primitive(string_type(), 0.0f64);
        let neg_zero = PropertyValue::primitive(string_type(), -0.0f64);
        assert_eq!(zero, neg_zero);
        assert_eq!(hash_of(&zero), hash_of(&neg_zero));
    }

    #[test]
    fn test_primitive_accessors() {
        let value = PrimitiveValue::Int(42);
        assert!(value.is_int());
        assert_eq!(value.as_int(), Some(42));
        assert_eq!(value.as_boolean(), None);
        assert_eq!(value.type_name(), "int");
    }

    #[test]
    fn test_enum_value() {
        let type_id =
            TypeIdentifier::new(TypeGuid::from_uuid(uuid::Uuid::from_u128(3)), "Criticality");
        let value = PropertyValue::enumeration(type_id, "High", 3);
        assert!(value.is_enum());
        assert_eq!(value.as_enum_symbol(), Some("High"));
        assert_eq!(format!("{value}"), "High");
    }

    #[test]
    fn test_display_renders_composites() {
        let mut fields = FieldMap::new();
        fields.insert("name", prim("report.csv"));
        fields.insert("size", PropertyValue::primitive(string_type(), 128i64));
        let value = PropertyValue::structure(struct_type(), fields);
        assert_eq!(format!("{value}"), "{name: \"report.csv\", size: 128}");

        let array = PropertyValue::array(struct_type(), vec![prim("a"), prim("b")]);
        assert_eq!(format!("{array}"), "[\"a\", \"b\"]");
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut fields = FieldMap::new();
        fields.insert("name", prim("report.csv"));
        fields.insert(
            "lastModified",
            PropertyValue::primitive(string_type(), Utc::now()),
        );
        let value = PropertyValue::structure(struct_type(), fields);

        let json = serde_json::to_string(&value).unwrap();
        let back: PropertyValue = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
