use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::dispatch::{IncomingMessage, ParsedItem};
use crate::error::JsonRpcError;
use crate::outcome::translate_outcome;
use crate::params::{ParamsError, bind_json_params, bind_text_params};
use crate::procedure::{CallContext, MethodTable, RpcMethod};
use crate::request::JsonRpcRequest;
use crate::response::JsonRpcMessage;
use crate::types::URI_CLIENT_REQUEST_ID;

/// What to write back for one inbound body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DispatchReply {
    Single(JsonRpcMessage),
    Batch(Vec<JsonRpcMessage>),
}

impl DispatchReply {
    pub fn messages(&self) -> &[JsonRpcMessage] {
        match self {
            DispatchReply::Single(msg) => std::slice::from_ref(msg),
            DispatchReply::Batch(msgs) => msgs,
        }
    }
}

/// Resolves, binds and invokes procedures from the method table.
///
/// Holds no per-request state; one instance is shared by every connection.
#[derive(Debug, Clone)]
pub struct JsonRpcDispatcher {
    methods: Arc<MethodTable>,
    max_batch_size: Option<usize>,
}

impl JsonRpcDispatcher {
    pub fn new(methods: impl Into<Arc<MethodTable>>) -> Self {
        Self {
            methods: methods.into(),
            max_batch_size: None,
        }
    }

    /// Cap the number of entries accepted in one batch body.
    pub fn with_max_batch_size(mut self, limit: Option<usize>) -> Self {
        self.max_batch_size = limit;
        self
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    pub fn max_batch_size(&self) -> Option<usize> {
        self.max_batch_size
    }

    /// Process one request. Notifications produce no envelope.
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        ctx: CallContext,
    ) -> Option<JsonRpcMessage> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "Ignoring notification");
            return None;
        };

        let Some(method) = self.methods.resolve(&request.method) else {
            debug!(method = %request.method, id = %id, "Method not found");
            return Some(JsonRpcError::method_not_found(id).into());
        };

        let args = match bind_json_params(method, request.params.as_ref()) {
            Ok(args) => args,
            Err(err) => {
                log_binding_failure(method, &err);
                return Some(
                    JsonRpcError::invalid_params(id, format!("converting JSON parameters: {}", err))
                        .into(),
                );
            }
        };

        let ctx = ctx
            .with_request_id(id.clone())
            .with_metadata("rpc.method", Value::String(request.method.clone()));
        let outcome = method.invoke(ctx, args.clone()).await;
        Some(translate_outcome(id, method.name(), &args, outcome))
    }

    async fn handle_item(&self, item: ParsedItem, ctx: CallContext) -> Option<JsonRpcMessage> {
        match item {
            Ok(request) => self.handle_request(request, ctx).await,
            Err(invalid) => Some(invalid.into()),
        }
    }

    /// Process a parsed body.
    ///
    /// Batch entries run concurrently; replies keep batch order and skip
    /// notifications. Returns `None` when nothing should be written.
    pub async fn handle_message(
        &self,
        incoming: IncomingMessage,
        ctx: CallContext,
    ) -> Option<DispatchReply> {
        match incoming {
            IncomingMessage::Single(item) => self.handle_item(item, ctx).await.map(DispatchReply::Single),
            IncomingMessage::Batch(items) => {
                match self.max_batch_size {
                    Some(limit) if items.len() > limit => {
                        warn!(size = items.len(), limit, "Rejecting oversized batch");
                        return Some(DispatchReply::Single(
                            JsonRpcError::invalid_request(
                                None,
                                format!("batch of {} requests exceeds limit of {}", items.len(), limit),
                            )
                            .into(),
                        ));
                    }
                    _ => {}
                }

                let replies: Vec<JsonRpcMessage> =
                    join_all(items.into_iter().map(|item| self.handle_item(item, ctx.clone())))
                        .await
                        .into_iter()
                        .flatten()
                        .collect();
                if replies.is_empty() {
                    None
                } else {
                    Some(DispatchReply::Batch(replies))
                }
            }
        }
    }

    /// Bind query-string values and invoke `method`, answering with the URI sentinel id.
    ///
    /// Binding failures are returned rather than enveloped; the URI transport
    /// reports them as plain client errors.
    pub async fn call_with_text_params<'a, F>(
        &self,
        method: &RpcMethod,
        lookup: F,
        ctx: CallContext,
    ) -> Result<JsonRpcMessage, ParamsError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let args = bind_text_params(method, lookup).inspect_err(|err| log_binding_failure(method, err))?;
        let outcome = method.invoke(ctx, args.clone()).await;
        Ok(translate_outcome(URI_CLIENT_REQUEST_ID, method.name(), &args, outcome))
    }
}

fn log_binding_failure(method: &RpcMethod, err: &ParamsError) {
    if err.is_registration_error() {
        warn!(method = %method.name(), error = %err, "Procedure declares an argument shape this transport cannot bind");
    } else {
        debug!(method = %method.name(), error = %err, "Parameter binding failed");
    }
}
