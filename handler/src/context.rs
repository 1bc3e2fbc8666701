use grassformation_api::GreengrassApi;
use grassformation_event::CustomResourceEvent;
use tracing::{Span, info_span};

/// Everything one invocation needs: the remote API and a span tagged with
/// the event's identifiers.
#[derive(Clone)]
pub struct Context<'a> {
    api: &'a dyn GreengrassApi,
    span: Span,
}

impl<'a> Context<'a> {
    pub fn new(api: &'a dyn GreengrassApi, event: &CustomResourceEvent) -> Self {
        let span = info_span!(
            "custom_resource",
            request_type = ?event.request_type,
            request_id = event.request_id.as_deref().unwrap_or_default(),
            stack_id = event.stack_id.as_deref().unwrap_or_default(),
            logical_resource_id = event.logical_resource_id.as_deref().unwrap_or_default(),
        );
        Self { api, span }
    }

    pub fn api(&self) -> &'a dyn GreengrassApi {
        self.api
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}
