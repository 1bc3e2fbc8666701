use grassformation_api::Entity;

use crate::descriptor::{FieldCoercion, ResourceDescriptor, Versioned};

const COERCIONS: &[FieldCoercion] = &[
    FieldCoercion::bool(
        "ResourceDataContainer.LocalDeviceResourceData.GroupOwnerSetting.AutoAddGroupOwner",
    ),
    FieldCoercion::bool(
        "ResourceDataContainer.LocalVolumeResourceData.GroupOwnerSetting.AutoAddGroupOwner",
    ),
];

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new(
    Entity::ResourceDefinition,
    Versioned::Collection {
        key: "Resources",
        coercions: COERCIONS,
    },
);
