use grassformation_api::{ApiError, Document, GreengrassApi, Operation, strip_metadata};
use grassformation_change::{AttributeChange, attribute_change, requires_update};
use grassformation_keypath::KeypathError;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    NO_PHYSICAL_ID,
    descriptor::{FieldCoercion, ResourceDescriptor, Versioned},
    normalize::normalize_element,
};

const NAME: &str = "Name";
const INITIAL_VERSION: &str = "InitialVersion";

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("missing required property \"{0}\"")]
    MissingProperty(&'static str),

    #[error("property \"{key}\" must be {expected}")]
    InvalidProperty {
        key: &'static str,
        expected: &'static str,
    },

    #[error("failed to normalize element {index} of \"{key}\"")]
    Normalize {
        key: &'static str,
        index: usize,
        #[source]
        source: KeypathError,
    },

    #[error("{operation} response has no \"Id\"")]
    MissingId { operation: Operation },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Outcome of a create or update: the stable identifier and the response data
/// handed back to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub physical_id: String,
    pub data: Document,
}

/// Issues the remote calls that bring one remote object in line with its
/// declared properties.
pub struct Reconciler<'a> {
    descriptor: ResourceDescriptor,
    api: &'a dyn GreengrassApi,
}

impl<'a> Reconciler<'a> {
    pub fn new(descriptor: ResourceDescriptor, api: &'a dyn GreengrassApi) -> Self {
        Self { descriptor, api }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    #[tracing::instrument(skip_all, fields(entity = %self.descriptor.entity))]
    pub async fn create(&self, properties: &Document) -> Result<Reconciled, ReconcileError> {
        let operations = &self.descriptor.operations;

        let mut input = Document::new();
        input.insert(NAME.to_owned(), Value::from(required_name(properties)?));
        if let Some(initial_version) = self.initial_version(properties)? {
            info!("initial version detected");
            input.insert(INITIAL_VERSION.to_owned(), Value::Object(initial_version));
        }

        let response = strip_metadata(self.api.invoke(operations.create, input).await?);
        let physical_id = response
            .get("Id")
            .and_then(Value::as_str)
            .ok_or(ReconcileError::MissingId {
                operation: operations.create,
            })?
            .to_owned();
        info!(%physical_id, "created");

        if let Some(role_key) = self.descriptor.role_key {
            if let Some(role) = properties.get(role_key) {
                self.associate_role(&physical_id, role_key, role).await?;
            }
        }

        Ok(Reconciled {
            physical_id,
            data: response,
        })
    }

    /// Publishes a new version and/or renames, then returns the current
    /// remote state. The physical id never changes.
    #[tracing::instrument(skip_all, fields(entity = %self.descriptor.entity, %physical_id))]
    pub async fn update(
        &self,
        physical_id: &str,
        old: &Document,
        new: &Document,
    ) -> Result<Reconciled, ReconcileError> {
        let operations = &self.descriptor.operations;

        if let Some(mut version) = self.new_version(old, new)? {
            info!("new version required");
            version.insert(self.descriptor.identity_key.to_owned(), Value::from(physical_id));
            self.api.invoke(operations.create_version, version).await?;
        }

        if requires_update(&[NAME], old, new) {
            info!("renamed");
            let mut input = self.identity(physical_id);
            input.insert(NAME.to_owned(), Value::from(required_name(new)?));
            self.api.invoke(operations.update, input).await?;
        }

        if let Some(role_key) = self.descriptor.role_key {
            match (attribute_change(role_key, old, new), new.get(role_key)) {
                (Some(AttributeChange::Added | AttributeChange::Changed), Some(role)) => {
                    self.associate_role(physical_id, role_key, role).await?;
                }
                (Some(AttributeChange::Removed), _) => {
                    info!("disassociating role");
                    self.api
                        .invoke(operations.disassociate_role, self.identity(physical_id))
                        .await?;
                }
                _ => {}
            }
        }

        let current = self.api.invoke(operations.get, self.identity(physical_id)).await?;
        Ok(Reconciled {
            physical_id: physical_id.to_owned(),
            data: strip_metadata(current),
        })
    }

    /// Deletes the remote object. Deleting something that never got created,
    /// or is already gone, succeeds.
    #[tracing::instrument(skip_all, fields(entity = %self.descriptor.entity, %physical_id))]
    pub async fn delete(&self, physical_id: &str) -> Result<(), ReconcileError> {
        if physical_id == NO_PHYSICAL_ID {
            info!("rollback of a failed create, nothing to delete");
            return Ok(());
        }
        let input = self.identity(physical_id);
        match self.api.invoke(self.descriptor.operations.delete, input).await {
            Ok(_) => {
                info!("deleted");
                Ok(())
            }
            Err(error) if error.is_not_found() => {
                warn!("requested to delete non existing resource");
                Ok(())
            }
            Err(error) => Err(error.into()),
        }
    }

    fn initial_version(&self, properties: &Document) -> Result<Option<Document>, ReconcileError> {
        match self.descriptor.versioned {
            Versioned::Collection { key, coercions } => {
                let Some(collection) = properties.get(key) else {
                    return Ok(None);
                };
                let elements = normalize_collection(key, coercions, collection)?;
                if elements.is_empty() {
                    return Ok(None);
                }
                let mut version = Document::new();
                version.insert(key.to_owned(), Value::Array(elements));
                Ok(Some(version))
            }
            Versioned::Attributes(attributes) => {
                let version = filter(properties, attributes);
                Ok((!version.is_empty()).then_some(version))
            }
        }
    }

    fn new_version(&self, old: &Document, new: &Document) -> Result<Option<Document>, ReconcileError> {
        match self.descriptor.versioned {
            Versioned::Collection { key, coercions } => {
                let Some(collection) = new.get(key) else {
                    return Ok(None);
                };
                if !requires_update(&[key], old, new) {
                    debug!(key, "collection unchanged");
                    return Ok(None);
                }
                let elements = normalize_collection(key, coercions, collection)?;
                let mut version = Document::new();
                version.insert(key.to_owned(), Value::Array(elements));
                Ok(Some(version))
            }
            Versioned::Attributes(attributes) => {
                if !requires_update(attributes, old, new) {
                    debug!("version attributes unchanged");
                    return Ok(None);
                }
                Ok(Some(filter(new, attributes)))
            }
        }
    }

    async fn associate_role(
        &self,
        physical_id: &str,
        role_key: &'static str,
        role: &Value,
    ) -> Result<(), ReconcileError> {
        let role_arn = role.as_str().ok_or(ReconcileError::InvalidProperty {
            key: role_key,
            expected: "a string",
        })?;
        info!(role_arn, "associating role");
        let mut input = self.identity(physical_id);
        input.insert("RoleArn".to_owned(), Value::from(role_arn));
        self.api
            .invoke(self.descriptor.operations.associate_role, input)
            .await?;
        Ok(())
    }

    fn identity(&self, physical_id: &str) -> Document {
        let mut input = Document::new();
        input.insert(self.descriptor.identity_key.to_owned(), Value::from(physical_id));
        input
    }
}

fn required_name(properties: &Document) -> Result<&str, ReconcileError> {
    match properties.get(NAME) {
        None => Err(ReconcileError::MissingProperty(NAME)),
        Some(Value::String(name)) => Ok(name),
        Some(_) => Err(ReconcileError::InvalidProperty {
            key: NAME,
            expected: "a string",
        }),
    }
}

fn normalize_collection(
    key: &'static str,
    coercions: &[FieldCoercion],
    collection: &Value,
) -> Result<Vec<Value>, ReconcileError> {
    let Value::Array(elements) = collection else {
        return Err(ReconcileError::InvalidProperty {
            key,
            expected: "a list",
        });
    };
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            normalize_element(coercions, element)
                .map_err(|source| ReconcileError::Normalize { key, index, source })
        })
        .collect()
}

fn filter(properties: &Document, keys: &[&str]) -> Document {
    keys.iter()
        .filter_map(|key| properties.get(*key).map(|value| ((*key).to_owned(), value.clone())))
        .collect()
}
