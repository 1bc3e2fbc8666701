mod cores;
mod devices;
mod functions;
mod groups;
mod loggers;
mod resources;
mod subscriptions;

use std::{fmt, str::FromStr};

use displaydoc::Display;
use thiserror::Error;

use crate::descriptor::ResourceDescriptor;

pub use self::groups::VERSION_ATTRIBUTES as GROUP_VERSION_ATTRIBUTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Core,
    Function,
    Logger,
    Resource,
    Subscription,
    Device,
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Display)]
pub enum ResourceKindError {
    /// Unknown resource kind "{0}"
    Unknown(String),
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Core,
        ResourceKind::Function,
        ResourceKind::Logger,
        ResourceKind::Resource,
        ResourceKind::Subscription,
        ResourceKind::Device,
        ResourceKind::Group,
    ];

    pub const fn descriptor(self) -> ResourceDescriptor {
        match self {
            ResourceKind::Core => cores::DESCRIPTOR,
            ResourceKind::Function => functions::DESCRIPTOR,
            ResourceKind::Logger => loggers::DESCRIPTOR,
            ResourceKind::Resource => resources::DESCRIPTOR,
            ResourceKind::Subscription => subscriptions::DESCRIPTOR,
            ResourceKind::Device => devices::DESCRIPTOR,
            ResourceKind::Group => groups::DESCRIPTOR,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ResourceKind::Core => "core",
            ResourceKind::Function => "function",
            ResourceKind::Logger => "logger",
            ResourceKind::Resource => "resource",
            ResourceKind::Subscription => "subscription",
            ResourceKind::Device => "device",
            ResourceKind::Group => "group",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the kind names in any case, with or without a `Definition`
/// suffix (`Function`, `function`, `FunctionDefinition`).
impl FromStr for ResourceKind {
    type Err = ResourceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower.strip_suffix("definition").unwrap_or(&lower);
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| ResourceKindError::Unknown(s.to_owned()))
    }
}
