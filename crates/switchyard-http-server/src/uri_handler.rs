//! Query-string calls: `GET /{method}?arg=value`

use std::sync::Arc;

use bytes::Bytes;
use http_body::Body;
use hyper::{Method, Request, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use switchyard_json_rpc_server::{JsonRpcDispatcher, RpcMethod, Transport};

use crate::body::{BodyError, read_body};
use crate::protocol::{FormValues, call_context, is_form_urlencoded};
use crate::responses::{RpcBody, empty_response, json_response, text_response};

/// Serves one registered method per path.
///
/// Answers carry the fixed URI client id. Decode failures are reported as
/// plain-text 400s and never reach the procedure.
#[derive(Debug, Clone)]
pub struct UriHandler {
    dispatcher: Arc<JsonRpcDispatcher>,
    max_body_size: usize,
}

impl UriHandler {
    pub fn new(dispatcher: Arc<JsonRpcDispatcher>, max_body_size: usize) -> Self {
        Self {
            dispatcher,
            max_body_size,
        }
    }

    pub async fn handle<B>(
        &self,
        method: &RpcMethod,
        req: Request<B>,
        cancel: CancellationToken,
    ) -> Response<RpcBody>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if method.is_streaming_only() {
            debug!(method = %method.name(), "Streaming-only method requested over HTTP");
            return empty_response(StatusCode::NOT_FOUND);
        }

        let ctx = call_context(&req, Transport::Uri, cancel);
        let query = req.uri().query().map(str::to_string);

        let form_body = if req.method() == Method::POST && is_form_urlencoded(req.headers()) {
            match read_body(req.into_body(), self.max_body_size).await {
                Ok(bytes) => bytes,
                Err(BodyError::TooLarge { limit }) => {
                    return text_response(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        format!("request body exceeds {} bytes\n", limit),
                    );
                }
                Err(err) => {
                    return text_response(
                        StatusCode::BAD_REQUEST,
                        format!("reading request body: {}\n", err),
                    );
                }
            }
        } else {
            Bytes::new()
        };

        let form = FormValues::parse(query.as_deref(), &form_body);
        match self
            .dispatcher
            .call_with_text_params(method, |name| form.get(name), ctx)
            .await
        {
            Ok(message) => json_response(&message),
            Err(err) => text_response(StatusCode::BAD_REQUEST, format!("{}\n", err)),
        }
    }
}
