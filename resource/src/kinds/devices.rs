use grassformation_api::Entity;

use crate::descriptor::{FieldCoercion, ResourceDescriptor, Versioned};

const COERCIONS: &[FieldCoercion] = &[FieldCoercion::bool("SyncShadow")];

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new(
    Entity::DeviceDefinition,
    Versioned::Collection {
        key: "Devices",
        coercions: COERCIONS,
    },
);
