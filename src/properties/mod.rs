//! Typed property-value model and the diff engine over it.
//!
//! Property trees are self-describing: every node carries the identifier of
//! the type definition it was produced from. The diff engine compares two
//! struct trees field by field and reports the ordered set of names whose
//! values differ.

/// Field-level diff over struct property trees.
pub mod diff;
/// Property value tree types.
pub mod value;

pub use diff::changed_field_names;
pub use value::{FieldMap, PrimitiveValue, PropertyCategory, PropertyValue, TypeIdentifier};
