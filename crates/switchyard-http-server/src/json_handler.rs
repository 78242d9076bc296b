//! JSON-RPC over HTTP POST

use std::sync::Arc;

use bytes::Bytes;
use http_body::Body;
use hyper::{Request, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use switchyard_json_rpc_server::{JsonRpcDispatcher, JsonRpcError, Transport, parse_json_rpc_body};

use crate::body::{BodyError, read_body};
use crate::directory::render_endpoint_list;
use crate::protocol::{call_context, request_host};
use crate::responses::{RpcBody, empty_response, html_response, json_response, text_response};

/// Handles JSON-RPC bodies posted to `/`
#[derive(Debug, Clone)]
pub struct JsonRpcHttpHandler {
    dispatcher: Arc<JsonRpcDispatcher>,
    max_body_size: usize,
}

impl JsonRpcHttpHandler {
    pub fn new(dispatcher: Arc<JsonRpcDispatcher>, max_body_size: usize) -> Self {
        Self {
            dispatcher,
            max_body_size,
        }
    }

    pub fn dispatcher(&self) -> &JsonRpcDispatcher {
        &self.dispatcher
    }

    pub async fn handle<B>(&self, req: Request<B>, cancel: CancellationToken) -> Response<RpcBody>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if req.uri().path() != "/" {
            return json_response(&JsonRpcError::invalid_request(
                None,
                format!("invalid path: {:?}", req.uri().path()),
            ));
        }

        let ctx = call_context(&req, Transport::JsonRpc, cancel);
        let host = request_host(&req);

        let body = match read_body(req.into_body(), self.max_body_size).await {
            Ok(body) => body,
            Err(BodyError::TooLarge { limit }) => {
                warn!(limit, "Rejecting oversized JSON-RPC body");
                return text_response(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("request body exceeds {} bytes", limit),
                );
            }
            Err(err) => {
                return json_response(&JsonRpcError::invalid_request(
                    None,
                    format!("reading request body: {}", err),
                ));
            }
        };

        if body.is_empty() {
            debug!("Empty body, rendering endpoint list");
            return html_response(render_endpoint_list(&host, self.dispatcher.methods()));
        }

        let incoming = match parse_json_rpc_body(&body) {
            Ok(incoming) => incoming,
            Err(parse_error) => {
                debug!(error = %parse_error.error, "Failed to parse JSON-RPC body");
                return json_response(&parse_error);
            }
        };

        match self.dispatcher.handle_message(incoming, ctx).await {
            Some(reply) => json_response(&reply),
            None => empty_response(StatusCode::OK),
        }
    }
}
