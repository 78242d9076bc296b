//! HTTP RPC server: configuration, builder and accept loop

use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use switchyard_json_rpc_server::{JsonRpcDispatcher, MethodTable, RpcMethod};

use crate::protocol::RemoteAddr;
use crate::{HttpRpcError, Result, RpcRouter};

/// Configuration for the HTTP RPC server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size
    pub max_body_size: usize,
    /// Maximum number of entries in one JSON-RPC batch (unbounded when `None`)
    pub max_batch_size: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 26657)),
            enable_cors: true,
            max_body_size: 1024 * 1024, // 1MB
            max_batch_size: None,
        }
    }
}

/// Builder for [`HttpRpcServer`]
pub struct HttpRpcServerBuilder {
    config: ServerConfig,
    methods: MethodTable,
    pending: Vec<RpcMethod>,
}

impl HttpRpcServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            methods: MethodTable::new(),
            pending: Vec::new(),
        }
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Cap JSON-RPC batch length
    pub fn max_batch_size(mut self, limit: Option<usize>) -> Self {
        self.config.max_batch_size = limit;
        self
    }

    /// Start from an existing method table
    pub fn methods(mut self, methods: MethodTable) -> Self {
        self.methods = methods;
        self
    }

    /// Register one method; duplicates are reported by [`build`](Self::build)
    pub fn register(mut self, method: RpcMethod) -> Self {
        self.pending.push(method);
        self
    }

    pub fn build(self) -> Result<HttpRpcServer> {
        let mut methods = self.methods;
        for method in self.pending {
            methods.register(method)?;
        }

        let dispatcher =
            JsonRpcDispatcher::new(methods).with_max_batch_size(self.config.max_batch_size);
        Ok(HttpRpcServer {
            router: RpcRouter::new(self.config, dispatcher),
        })
    }
}

impl Default for HttpRpcServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Serves a method table over HTTP
#[derive(Debug, Clone)]
pub struct HttpRpcServer {
    router: RpcRouter,
}

impl HttpRpcServer {
    pub fn builder() -> HttpRpcServerBuilder {
        HttpRpcServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        self.router.config()
    }

    pub fn router(&self) -> &RpcRouter {
        &self.router
    }

    /// Bind the configured address and serve until an accept error
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config().bind_address).await?;
        info!("HTTP RPC server listening on {}", listener.local_addr()?);
        info!(
            "{} methods registered",
            self.router.dispatcher().methods().len()
        );
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, peer_addr) = listener.accept().await.map_err(HttpRpcError::Io)?;
            debug!("New connection from {}", peer_addr);

            let router = self.router.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service =
                    service_fn(move |req| handle_request(req, router.clone(), peer_addr));

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    let err_str = err.to_string();
                    if err_str.contains("connection closed before message completed") {
                        debug!("Client disconnected (normal): {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }
}

async fn handle_request(
    mut req: Request<Incoming>,
    router: RpcRouter,
    peer_addr: SocketAddr,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    req.extensions_mut().insert(RemoteAddr(peer_addr));

    // Cancelled if hyper drops this future because the client went away.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    Ok(router.route(req, cancel).await)
}
