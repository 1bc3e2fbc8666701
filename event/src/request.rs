use displaydoc::Display;
use thiserror::Error;

use crate::{CustomResourceEvent, Properties, RequestType};

/// What a single lifecycle event asks the reconciler to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationRequest {
    Create {
        properties: Properties,
    },
    Update {
        physical_id: String,
        old_properties: Properties,
        new_properties: Properties,
    },
    Delete {
        physical_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Display)]
pub enum RequestError {
    /// {0:?} request has no PhysicalResourceId
    MissingPhysicalResourceId(RequestType),
    /// Update request has no OldResourceProperties
    MissingOldResourceProperties,
}

impl TryFrom<&CustomResourceEvent> for ReconciliationRequest {
    type Error = RequestError;

    fn try_from(event: &CustomResourceEvent) -> Result<Self, Self::Error> {
        let physical_id = || {
            event
                .physical_resource_id
                .clone()
                .ok_or(RequestError::MissingPhysicalResourceId(event.request_type))
        };
        match event.request_type {
            RequestType::Create => Ok(ReconciliationRequest::Create {
                properties: event.resource_properties.clone(),
            }),
            RequestType::Update => Ok(ReconciliationRequest::Update {
                physical_id: physical_id()?,
                old_properties: event
                    .old_resource_properties
                    .clone()
                    .ok_or(RequestError::MissingOldResourceProperties)?,
                new_properties: event.resource_properties.clone(),
            }),
            RequestType::Delete => Ok(ReconciliationRequest::Delete {
                physical_id: physical_id()?,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> CustomResourceEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn create_ignores_physical_id() {
        let request = ReconciliationRequest::try_from(&event(json!({
            "RequestType": "Create",
            "ResourceProperties": { "Name": "x" },
        })))
        .unwrap();
        let ReconciliationRequest::Create { properties } = request else {
            panic!("expected create");
        };
        assert_eq!(properties["Name"], json!("x"));
    }

    #[test]
    fn update_needs_old_properties() {
        let result = ReconciliationRequest::try_from(&event(json!({
            "RequestType": "Update",
            "PhysicalResourceId": "id-1",
            "ResourceProperties": { "Name": "x" },
        })));
        assert_eq!(result, Err(RequestError::MissingOldResourceProperties));
    }

    #[test]
    fn delete_needs_physical_id() {
        let result = ReconciliationRequest::try_from(&event(json!({ "RequestType": "Delete" })));
        assert_eq!(
            result,
            Err(RequestError::MissingPhysicalResourceId(RequestType::Delete))
        );
    }

    #[test]
    fn delete_with_sentinel() {
        let request = ReconciliationRequest::try_from(&event(json!({
            "RequestType": "Delete",
            "PhysicalResourceId": "NONE",
        })))
        .unwrap();
        assert_eq!(
            request,
            ReconciliationRequest::Delete {
                physical_id: "NONE".to_owned()
            }
        );
    }
}
