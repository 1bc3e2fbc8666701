//! Greengrass resource kinds and the reconciliation of their remote
//! definitions against declared properties.

mod descriptor;
mod kinds;
mod normalize;
mod reconcile;

pub use crate::descriptor::{Bindings, Coercion, FieldCoercion, ResourceDescriptor, Versioned};
pub use crate::kinds::{GROUP_VERSION_ATTRIBUTES, ResourceKind, ResourceKindError};
pub use crate::normalize::normalize_element;
pub use crate::reconcile::{Reconciled, ReconcileError, Reconciler};

/// Physical id reported for a create that never completed. Deleting it is a
/// no-op.
pub const NO_PHYSICAL_ID: &str = "NONE";
