use grassformation_api::Entity;

use crate::descriptor::{ResourceDescriptor, Versioned};

/// Version ARNs of the member definitions that make up a group version.
pub const VERSION_ATTRIBUTES: &[&str] = &[
    "CoreDefinitionVersionArn",
    "DeviceDefinitionVersionArn",
    "FunctionDefinitionVersionArn",
    "LoggerDefinitionVersionArn",
    "ResourceDefinitionVersionArn",
    "SubscriptionDefinitionVersionArn",
];

pub const DESCRIPTOR: ResourceDescriptor =
    ResourceDescriptor::new(Entity::Group, Versioned::Attributes(VERSION_ATTRIBUTES))
        .with_role_key("GroupRoleArn");
