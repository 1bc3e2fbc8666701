use grassformation_api::Entity;

use crate::descriptor::{FieldCoercion, ResourceDescriptor, Versioned};

const COERCIONS: &[FieldCoercion] = &[FieldCoercion::int("Space")];

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new(
    Entity::LoggerDefinition,
    Versioned::Collection {
        key: "Loggers",
        coercions: COERCIONS,
    },
);
