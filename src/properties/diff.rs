//! Field-level diff over struct property trees.
//!
//! The output is an ordered set of field names consumed downstream as a
//! delimited list, so the ordering is a contract: changed and added names
//! come first in the new tree's declaration order, removed names follow in
//! the old tree's declaration order. An absent tree reads as "all names
//! changed" in the direction of the tree that is present.

use super::value::FieldMap;

/// Computes the ordered set of field names whose values differ between two
/// property trees.
///
/// Policy:
/// - old absent, new present: all of new's names, in new's order.
/// - new absent, old present: all of old's names, in old's order.
/// - both present: names added or changed in new (new's order), then names
///   removed from old (old's order). Names equal in both are excluded.
/// - both absent: empty.
///
/// Field names are unique within a [`FieldMap`], so the result is a set.
#[must_use]
pub fn changed_field_names(old: Option<&FieldMap>, new: Option<&FieldMap>) -> Vec<String> {
    match (old, new) {
        (None, None) => Vec::new(),
        (None, Some(new)) => new.names().map(str::to_string).collect(),
        (Some(old), None) => old.names().map(str::to_string).collect(),
        (Some(old), Some(new)) => {
            let mut changed: Vec<String> = Vec::new();

            for (name, new_value) in new.iter() {
                match old.get(name) {
                    Some(old_value) if old_value == new_value => {}
                    _ => changed.push(name.to_string()),
                }
            }

            for name in old.names() {
                if !new.contains(name) {
                    changed.push(name.to_string());
                }
            }

            changed
        }
    }
}
