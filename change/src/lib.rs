//! Decides whether declared properties changed between two lifecycle events.

use serde_json::{Map, Value};
use tracing::debug;

pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeChange {
    Added,
    Removed,
    Changed,
}

/// Classifies how `attribute` differs between `old` and `new`, if at all.
///
/// Values are compared structurally: mappings regardless of key order,
/// sequences element by element.
pub fn attribute_change(
    attribute: &str,
    old: &Properties,
    new: &Properties,
) -> Option<AttributeChange> {
    match (old.get(attribute), new.get(attribute)) {
        (None, None) => None,
        (None, Some(value)) => {
            debug!(attribute, %value, "new value");
            Some(AttributeChange::Added)
        }
        (Some(value), None) => {
            debug!(attribute, %value, "value removed");
            Some(AttributeChange::Removed)
        }
        (Some(old_value), Some(new_value)) => {
            debug!(attribute, %new_value, %old_value, "evaluating");
            (old_value != new_value).then_some(AttributeChange::Changed)
        }
    }
}

/// True if any of `attributes` was added, removed or changed.
pub fn requires_update<S>(attributes: &[S], old: &Properties, new: &Properties) -> bool
where
    S: AsRef<str>,
{
    attributes
        .iter()
        .any(|attribute| attribute_change(attribute.as_ref(), old, new).is_some())
}
