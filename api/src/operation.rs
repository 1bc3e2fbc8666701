use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A remote Greengrass object that is created, versioned and deleted as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    CoreDefinition,
    DeviceDefinition,
    FunctionDefinition,
    LoggerDefinition,
    ResourceDefinition,
    SubscriptionDefinition,
    Group,
}

impl Entity {
    pub const fn name(self) -> &'static str {
        match self {
            Entity::CoreDefinition => "CoreDefinition",
            Entity::DeviceDefinition => "DeviceDefinition",
            Entity::FunctionDefinition => "FunctionDefinition",
            Entity::LoggerDefinition => "LoggerDefinition",
            Entity::ResourceDefinition => "ResourceDefinition",
            Entity::SubscriptionDefinition => "SubscriptionDefinition",
            Entity::Group => "Group",
        }
    }

    /// Name of the id parameter the remote API expects, e.g. `FunctionDefinitionId`.
    pub const fn identity_key(self) -> &'static str {
        match self {
            Entity::CoreDefinition => "CoreDefinitionId",
            Entity::DeviceDefinition => "DeviceDefinitionId",
            Entity::FunctionDefinition => "FunctionDefinitionId",
            Entity::LoggerDefinition => "LoggerDefinitionId",
            Entity::ResourceDefinition => "ResourceDefinitionId",
            Entity::SubscriptionDefinition => "SubscriptionDefinitionId",
            Entity::Group => "GroupId",
        }
    }

    /// Path segment used in ARNs, e.g. `definition/functions`.
    pub const fn arn_segment(self) -> &'static str {
        match self {
            Entity::CoreDefinition => "definition/cores",
            Entity::DeviceDefinition => "definition/devices",
            Entity::FunctionDefinition => "definition/functions",
            Entity::LoggerDefinition => "definition/loggers",
            Entity::ResourceDefinition => "definition/resources",
            Entity::SubscriptionDefinition => "definition/subscriptions",
            Entity::Group => "groups",
        }
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Create,
    CreateVersion,
    Update,
    Delete,
    Get,
    AssociateRole,
    DisassociateRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    pub entity: Entity,
    pub action: Action,
}

impl Operation {
    pub const fn new(entity: Entity, action: Action) -> Self {
        Self { entity, action }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = self.entity.name();
        match self.action {
            Action::Create => write!(f, "Create{entity}"),
            Action::CreateVersion => write!(f, "Create{entity}Version"),
            Action::Update => write!(f, "Update{entity}"),
            Action::Delete => write!(f, "Delete{entity}"),
            Action::Get => write!(f, "Get{entity}"),
            Action::AssociateRole => write!(f, "AssociateRoleTo{entity}"),
            Action::DisassociateRole => write!(f, "DisassociateRoleFrom{entity}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names_follow_remote_api() {
        let cases = [
            (Entity::FunctionDefinition, Action::Create, "CreateFunctionDefinition"),
            (
                Entity::FunctionDefinition,
                Action::CreateVersion,
                "CreateFunctionDefinitionVersion",
            ),
            (Entity::CoreDefinition, Action::Update, "UpdateCoreDefinition"),
            (Entity::Group, Action::CreateVersion, "CreateGroupVersion"),
            (Entity::Group, Action::Get, "GetGroup"),
            (Entity::Group, Action::AssociateRole, "AssociateRoleToGroup"),
            (Entity::Group, Action::DisassociateRole, "DisassociateRoleFromGroup"),
        ];
        for (entity, action, name) in cases {
            assert_eq!(Operation::new(entity, action).to_string(), name);
        }
    }

    #[test]
    fn identity_keys() {
        assert_eq!(Entity::LoggerDefinition.identity_key(), "LoggerDefinitionId");
        assert_eq!(Entity::Group.identity_key(), "GroupId");
    }
}
