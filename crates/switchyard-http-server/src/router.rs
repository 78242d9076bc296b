//! Path routing between the JSON-RPC and URI handlers

use std::sync::Arc;

use bytes::Bytes;
use http_body::Body;
use hyper::{Method, Request, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use switchyard_json_rpc_server::JsonRpcDispatcher;

use crate::cors::CorsLayer;
use crate::json_handler::JsonRpcHttpHandler;
use crate::responses::{RpcBody, method_not_allowed, text_response};
use crate::server::ServerConfig;
use crate::uri_handler::UriHandler;

/// Routes `/` to JSON-RPC and `/{method}` to URI calls.
#[derive(Debug, Clone)]
pub struct RpcRouter {
    config: Arc<ServerConfig>,
    dispatcher: Arc<JsonRpcDispatcher>,
    json_handler: JsonRpcHttpHandler,
    uri_handler: UriHandler,
}

impl RpcRouter {
    pub fn new(config: ServerConfig, dispatcher: JsonRpcDispatcher) -> Self {
        let dispatcher = Arc::new(dispatcher);
        Self {
            json_handler: JsonRpcHttpHandler::new(Arc::clone(&dispatcher), config.max_body_size),
            uri_handler: UriHandler::new(Arc::clone(&dispatcher), config.max_body_size),
            config: Arc::new(config),
            dispatcher,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &JsonRpcDispatcher {
        &self.dispatcher
    }

    /// Route one request. `cancel` is handed to whichever procedure runs.
    pub async fn route<B>(&self, req: Request<B>, cancel: CancellationToken) -> Response<RpcBody>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        debug!("Handling {} {}", req.method(), req.uri().path());

        if req.method() == Method::OPTIONS {
            return if self.config.enable_cors {
                CorsLayer::preflight_response()
            } else {
                method_not_allowed()
            };
        }

        let mut response = if req.method() != Method::GET && req.method() != Method::POST {
            method_not_allowed()
        } else if req.uri().path() == "/" {
            self.json_handler.handle(req, cancel).await
        } else {
            let name = req.uri().path().strip_prefix('/').unwrap_or_default();
            match self.dispatcher.methods().get(name).cloned() {
                Some(method) => self.uri_handler.handle(&method, req, cancel).await,
                None => text_response(StatusCode::NOT_FOUND, "Not Found"),
            }
        };

        if self.config.enable_cors {
            CorsLayer::apply_cors_headers(response.headers_mut());
        }
        response
    }
}
