use grassformation_api::Entity;

use crate::descriptor::{ResourceDescriptor, Versioned};

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new(
    Entity::SubscriptionDefinition,
    Versioned::Collection {
        key: "Subscriptions",
        coercions: &[],
    },
);
