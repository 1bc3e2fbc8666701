use grassformation_api::{Action, Entity, Operation};

/// Static description of one resource kind: which attribute holds its
/// versioned content, how that content is normalized, and which remote
/// operations manage it.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDescriptor {
    pub entity: Entity,
    pub identity_key: &'static str,
    pub versioned: Versioned,
    /// Property holding a role to associate with the remote object, if the
    /// kind supports one.
    pub role_key: Option<&'static str>,
    pub operations: Bindings,
}

impl ResourceDescriptor {
    pub const fn new(entity: Entity, versioned: Versioned) -> Self {
        Self {
            entity,
            identity_key: entity.identity_key(),
            versioned,
            role_key: None,
            operations: Bindings::for_entity(entity),
        }
    }

    pub const fn with_role_key(self, role_key: &'static str) -> Self {
        Self {
            role_key: Some(role_key),
            ..self
        }
    }
}

/// What a new version of the remote object is built from.
#[derive(Debug, Clone, Copy)]
pub enum Versioned {
    /// A list of member elements under `key`, each normalized before sending.
    Collection {
        key: &'static str,
        coercions: &'static [FieldCoercion],
    },
    /// A fixed set of scalar attributes copied as-is.
    Attributes(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Bool,
    Int,
}

/// A coercion applied to the field at `keypath` inside each element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCoercion {
    pub keypath: &'static str,
    pub coercion: Coercion,
}

impl FieldCoercion {
    pub const fn bool(keypath: &'static str) -> Self {
        Self {
            keypath,
            coercion: Coercion::Bool,
        }
    }

    pub const fn int(keypath: &'static str) -> Self {
        Self {
            keypath,
            coercion: Coercion::Int,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bindings {
    pub create: Operation,
    pub create_version: Operation,
    pub update: Operation,
    pub delete: Operation,
    pub get: Operation,
    pub associate_role: Operation,
    pub disassociate_role: Operation,
}

impl Bindings {
    pub const fn for_entity(entity: Entity) -> Self {
        Self {
            create: Operation::new(entity, Action::Create),
            create_version: Operation::new(entity, Action::CreateVersion),
            update: Operation::new(entity, Action::Update),
            delete: Operation::new(entity, Action::Delete),
            get: Operation::new(entity, Action::Get),
            associate_role: Operation::new(entity, Action::AssociateRole),
            disassociate_role: Operation::new(entity, Action::DisassociateRole),
        }
    }
}
