//! Translating procedure outcomes into wire envelopes.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::{JsonRpcError, JsonRpcErrorObject};
use crate::params::BoundArgs;
use crate::response::JsonRpcMessage;
use crate::types::RequestId;

/// Domain failures caused by the caller's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BadInput {
    #[error("height must be greater than zero")]
    ZeroOrNegativeHeight,

    #[error("zero or negative per_page")]
    ZeroOrNegativePerPage,

    #[error("page out of range")]
    PageOutOfRange,

    #[error("invalid request")]
    InvalidRequest,
}

/// Error returned by a procedure.
#[derive(Debug, Error)]
pub enum ProcedureError {
    /// A fully formed wire error, forwarded as-is
    #[error("{0}")]
    Rpc(JsonRpcErrorObject),

    /// The caller's input was unacceptable
    #[error("{}", bad_input_message(.kind, .context.as_deref()))]
    BadInput {
        kind: BadInput,
        context: Option<String>,
    },

    /// Anything else; reported as an internal error
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

fn bad_input_message(kind: &BadInput, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("{}: {}", kind, context),
        None => kind.to_string(),
    }
}

impl ProcedureError {
    pub fn bad_input(kind: BadInput, context: impl Into<String>) -> Self {
        ProcedureError::BadInput {
            kind,
            context: Some(context.into()),
        }
    }

    pub fn internal(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ProcedureError::Internal(err.into())
    }

    pub fn classify(&self) -> ErrorClass {
        match self {
            ProcedureError::Rpc(_) => ErrorClass::PassThrough,
            ProcedureError::BadInput { .. } => ErrorClass::InvalidRequest,
            ProcedureError::Internal(err) if wrapped_bad_input(err.as_ref()).is_some() => {
                ErrorClass::InvalidRequest
            }
            ProcedureError::Internal(_) => ErrorClass::Internal,
        }
    }
}

/// Looks for a [`BadInput`] in `err` itself or one `source()` level down.
fn wrapped_bad_input(err: &(dyn std::error::Error + 'static)) -> Option<BadInput> {
    err.downcast_ref::<BadInput>()
        .or_else(|| err.source().and_then(|source| source.downcast_ref::<BadInput>()))
        .copied()
}

impl From<BadInput> for ProcedureError {
    fn from(kind: BadInput) -> Self {
        ProcedureError::BadInput {
            kind,
            context: None,
        }
    }
}

impl From<JsonRpcErrorObject> for ProcedureError {
    fn from(error: JsonRpcErrorObject) -> Self {
        ProcedureError::Rpc(error)
    }
}

/// Wire bucket a procedure error lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    PassThrough,
    InvalidRequest,
    Internal,
}

/// Trait for errors that can be converted to JSON-RPC error objects
pub trait ToJsonRpcError: std::error::Error + Send + Sync + 'static {
    /// Convert this error to a JSON-RPC error object
    fn to_error_object(&self) -> JsonRpcErrorObject;
}

impl ToJsonRpcError for ProcedureError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            ProcedureError::Rpc(object) => object.clone(),
            ProcedureError::BadInput { .. } => JsonRpcErrorObject::invalid_request(Some(self.to_string())),
            ProcedureError::Internal(_) => match self.classify() {
                ErrorClass::InvalidRequest => JsonRpcErrorObject::invalid_request(Some(self.to_string())),
                _ => JsonRpcErrorObject::internal_error(Some(self.to_string())),
            },
        }
    }
}

/// Turns a procedure's return into exactly one envelope keyed to `id`.
pub fn translate_outcome(
    id: RequestId,
    method: &str,
    args: &BoundArgs,
    outcome: Result<Value, ProcedureError>,
) -> JsonRpcMessage {
    debug!(method = %method, args = ?args, returns = ?outcome, "procedure returned");
    match outcome {
        Ok(value) => JsonRpcMessage::success(id, value),
        Err(err) => JsonRpcMessage::error(JsonRpcError::new(Some(id), err.to_error_object())),
    }
}
