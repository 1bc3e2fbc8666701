//! Turns one custom-resource event into one response document.

mod context;

use std::error::Error as StdError;

use grassformation_event::{
    CustomResourceEvent, CustomResourceResponse, Properties, RESOURCE_KIND_PROPERTY,
    ReconciliationRequest, RequestError, RequestType,
};
use grassformation_resource::{
    NO_PHYSICAL_ID, ReconcileError, Reconciled, Reconciler, ResourceKind, ResourceKindError,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{Instrument, error, info};

pub use crate::context::Context;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("missing property \"GrassFormationResourceType\"")]
    MissingResourceKind,

    #[error("property \"GrassFormationResourceType\" must be a string")]
    InvalidResourceKind,

    #[error(transparent)]
    UnknownResourceKind(#[from] ResourceKindError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// Reads the resource kind a dispatched event is for.
pub fn resource_kind(properties: &Properties) -> Result<ResourceKind, HandlerError> {
    match properties.get(RESOURCE_KIND_PROPERTY) {
        None => Err(HandlerError::MissingResourceKind),
        Some(Value::String(kind)) => Ok(kind.parse()?),
        Some(_) => Err(HandlerError::InvalidResourceKind),
    }
}

/// Runs one reconciliation. Returns `None` for deletes.
pub async fn reconcile(
    ctx: &Context<'_>,
    kind: ResourceKind,
    request: ReconciliationRequest,
) -> Result<Option<Reconciled>, ReconcileError> {
    let reconciler = Reconciler::new(kind.descriptor(), ctx.api());
    match request {
        ReconciliationRequest::Create { properties } => reconciler.create(&properties).await.map(Some),
        ReconciliationRequest::Update {
            physical_id,
            old_properties,
            new_properties,
        } => reconciler
            .update(&physical_id, &old_properties, &new_properties)
            .await
            .map(Some),
        ReconciliationRequest::Delete { physical_id } => {
            reconciler.delete(&physical_id).await.map(|()| None)
        }
    }
}

/// Handles an event for a known resource kind.
pub async fn handle(
    ctx: &Context<'_>,
    kind: ResourceKind,
    event: &CustomResourceEvent,
) -> CustomResourceResponse {
    let result = run(ctx, kind, event).instrument(ctx.span().clone()).await;
    respond(ctx, event, result)
}

async fn run(
    ctx: &Context<'_>,
    kind: ResourceKind,
    event: &CustomResourceEvent,
) -> Result<Option<Reconciled>, HandlerError> {
    info!(%kind, "handling");
    let request = ReconciliationRequest::try_from(event)?;
    Ok(reconcile(ctx, kind, request).await?)
}

/// Handles an event whose resource kind is named by its
/// `GrassFormationResourceType` property.
///
/// Deleting `"NONE"` succeeds before the kind is read, so a create that
/// failed on a bad kind can still be rolled back.
pub async fn dispatch(ctx: &Context<'_>, event: &CustomResourceEvent) -> CustomResourceResponse {
    if is_rollback_of_failed_create(event) {
        return respond(ctx, event, Ok(None));
    }
    match resource_kind(&event.resource_properties) {
        Ok(kind) => handle(ctx, kind, event).await,
        Err(error) => respond(ctx, event, Err(error)),
    }
}

fn is_rollback_of_failed_create(event: &CustomResourceEvent) -> bool {
    event.request_type == RequestType::Delete
        && event.physical_resource_id.as_deref() == Some(NO_PHYSICAL_ID)
}

fn respond(
    ctx: &Context<'_>,
    event: &CustomResourceEvent,
    result: Result<Option<Reconciled>, HandlerError>,
) -> CustomResourceResponse {
    let _entered = ctx.span().enter();
    let event_physical_id = || {
        event
            .physical_resource_id
            .clone()
            .unwrap_or_else(|| NO_PHYSICAL_ID.to_owned())
    };
    match result {
        Ok(Some(Reconciled { physical_id, data })) => {
            info!(%physical_id, "succeeded");
            CustomResourceResponse::success(event, physical_id, data)
        }
        Ok(None) => {
            info!("succeeded");
            CustomResourceResponse::success(event, event_physical_id(), Properties::new())
        }
        Err(failure) => {
            let reason = error_chain(&failure);
            error!(%reason, "failed");
            CustomResourceResponse::failure(event, event_physical_id(), reason)
        }
    }
}

/// Renders an error followed by its source messages.
fn error_chain(error: &dyn StdError) -> String {
    let mut reason = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }
    reason
}
