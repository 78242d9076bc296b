//! # HTTP RPC Server
//!
//! HTTP transport for a [`switchyard_json_rpc_server::MethodTable`]. Every
//! registered procedure is reachable two ways from the same listener:
//!
//! - **URI calls**: `GET /{method}?arg=value`, with arguments coerced from
//!   query-string text
//! - **JSON-RPC**: `POST /` carrying one request object or a batch array
//!
//! An empty `POST /` (or a browser `GET /`) renders an HTML directory of the
//! available methods.

pub mod body;
pub mod cors;
pub mod directory;
pub mod json_handler;
pub mod prelude;
pub mod protocol;
pub mod responses;
pub mod router;
pub mod server;
pub mod uri_handler;

#[cfg(test)]
mod tests;

// Re-export main types
pub use cors::CorsLayer;
pub use json_handler::JsonRpcHttpHandler;
pub use protocol::RemoteAddr;
pub use router::RpcRouter;
pub use server::{HttpRpcServer, HttpRpcServerBuilder, ServerConfig};
pub use uri_handler::UriHandler;

// Re-export foundational types
pub use switchyard_json_rpc_server::{JsonRpcDispatcher, MethodTable, RpcMethod};

/// Result type for HTTP RPC operations
pub type Result<T> = std::result::Result<T, HttpRpcError>;

/// HTTP RPC server errors
#[derive(Debug, thiserror::Error)]
pub enum HttpRpcError {
    #[error("Method registration error: {0}")]
    Registration(#[from] switchyard_json_rpc_server::TableError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
