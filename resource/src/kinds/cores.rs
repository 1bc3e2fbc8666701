use grassformation_api::Entity;

use crate::descriptor::{FieldCoercion, ResourceDescriptor, Versioned};

const COERCIONS: &[FieldCoercion] = &[FieldCoercion::bool("SyncShadow")];

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new(
    Entity::CoreDefinition,
    Versioned::Collection {
        key: "Cores",
        coercions: COERCIONS,
    },
);
