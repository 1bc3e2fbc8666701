//! The remote Greengrass definition-versioning API, as seen by the reconciler.

mod memory;
mod operation;

use async_trait::async_trait;
use displaydoc::Display;
use serde_json::{Map, Value};
use thiserror::Error;

pub use crate::memory::{DefinitionRecord, MemoryGreengrass, MemoryState, RecordedCall, VersionRecord};
pub use crate::operation::{Action, Entity, Operation};

/// Request or response body of a remote call.
pub type Document = Map<String, Value>;

/// Error code the remote API uses when an identifier does not exist.
pub const ID_NOT_FOUND: &str = "IdNotFoundException";

/// Transport envelope field the remote API attaches to every response.
pub const RESPONSE_METADATA: &str = "ResponseMetadata";

#[derive(Debug, Clone, PartialEq, Eq, Error, Display)]
pub enum ApiError {
    /// {operation} failed with {code}: {message}
    Service {
        operation: Operation,
        code: String,
        message: String,
    },
    /// {operation} could not be sent: {message}
    Transport {
        operation: Operation,
        message: String,
    },
}

impl ApiError {
    pub fn service(operation: Operation, code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Service {
            operation,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Service { code, .. } => Some(code),
            ApiError::Transport { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(ID_NOT_FOUND)
    }
}

/// A client of the remote API.
///
/// Every call is an opaque, possibly failing remote procedure: `input` is the
/// request body, the returned document is the raw response including
/// [`RESPONSE_METADATA`].
#[async_trait]
pub trait GreengrassApi: Send + Sync {
    async fn invoke(&self, operation: Operation, input: Document) -> Result<Document, ApiError>;
}

/// Removes the transport envelope from a response.
pub fn strip_metadata(mut response: Document) -> Document {
    response.shift_remove(RESPONSE_METADATA);
    response
}
