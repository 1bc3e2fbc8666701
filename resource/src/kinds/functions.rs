use grassformation_api::Entity;

use crate::descriptor::{FieldCoercion, ResourceDescriptor, Versioned};

const COERCIONS: &[FieldCoercion] = &[
    FieldCoercion::bool("FunctionConfiguration.Environment.AccessSysfs"),
    FieldCoercion::bool("FunctionConfiguration.Pinned"),
    FieldCoercion::int("FunctionConfiguration.MemorySize"),
    FieldCoercion::int("FunctionConfiguration.Timeout"),
];

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new(
    Entity::FunctionDefinition,
    Versioned::Collection {
        key: "Functions",
        coercions: COERCIONS,
    },
);
