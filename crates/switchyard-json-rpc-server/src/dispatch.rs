//! Parsing of JSON-RPC request bodies, single or batched.

use serde_json::Value;

use crate::error::JsonRpcError;
use crate::request::JsonRpcRequest;
use crate::types::RequestId;

/// One entry of an inbound body: a well-formed request, or the invalid-request
/// envelope to answer a malformed one with.
pub type ParsedItem = Result<JsonRpcRequest, JsonRpcError>;

/// Shape of an inbound body
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingMessage {
    Single(ParsedItem),
    Batch(Vec<ParsedItem>),
}

impl IncomingMessage {
    pub fn is_batch(&self) -> bool {
        matches!(self, IncomingMessage::Batch(_))
    }

    pub fn len(&self) -> usize {
        match self {
            IncomingMessage::Single(_) => 1,
            IncomingMessage::Batch(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse a body into a single request or a batch.
///
/// A body whose first non-whitespace byte is `[` is a batch. Syntax errors
/// fail the whole body with a parse-error envelope; a batch entry that is
/// valid JSON but not a request object fails only that entry. A lone scalar
/// body is a parse error and a lone `null` is an id-less request.
pub fn parse_json_rpc_body(body: &[u8]) -> Result<IncomingMessage, JsonRpcError> {
    if body.trim_ascii_start().starts_with(b"[") {
        let items: Vec<Value> = serde_json::from_slice(body)
            .map_err(|e| JsonRpcError::parse_error(format!("decoding request: {}", e)))?;
        Ok(IncomingMessage::Batch(items.into_iter().map(parse_item).collect()))
    } else {
        let item: Value = serde_json::from_slice(body)
            .map_err(|e| JsonRpcError::parse_error(format!("decoding request: {}", e)))?;
        match item {
            // A bare `null` decodes to an empty request without an id.
            Value::Null => Ok(IncomingMessage::Single(Ok(JsonRpcRequest::notification("", None)))),
            Value::Object(_) => Ok(IncomingMessage::Single(parse_item(item))),
            other => Err(JsonRpcError::parse_error(format!(
                "decoding request: expected a request object, found {}",
                other
            ))),
        }
    }
}

fn parse_item(item: Value) -> ParsedItem {
    let id = item
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());
    serde_json::from_value::<JsonRpcRequest>(item)
        .map_err(|e| JsonRpcError::invalid_request(id, format!("decoding request: {}", e)))
}
