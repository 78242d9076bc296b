//! # HTTP RPC Server Prelude
//!
//! ```rust
//! use switchyard_http_server::prelude::*;
//! ```

// Core server types
pub use crate::server::{HttpRpcServer, HttpRpcServerBuilder, ServerConfig};
pub use crate::router::RpcRouter;
pub use crate::cors::CorsLayer;

// Procedure declaration
pub use switchyard_json_rpc_server::prelude::*;

// Error types
pub use crate::{HttpRpcError, Result};
