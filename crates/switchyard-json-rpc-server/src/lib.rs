//! # JSON-RPC Dispatch Core
//!
//! Transport-agnostic dispatch of JSON-RPC 2.0 calls onto a table of
//! runtime-registered procedures. Each procedure declares its arguments as a
//! list of named [`ArgShape`]s; wire values are coerced into those shapes
//! before the procedure runs, and whatever it returns is translated back
//! into a JSON-RPC envelope.
//!
//! ## Features
//! - Single and batched requests with per-entry error isolation
//! - Notifications are never answered
//! - Named (object) and positional (array) parameters
//! - Query-string binding for URI-style transports
//! - Closed classification of procedure failures into the wire error taxonomy

pub mod coerce;
pub mod dispatch;
pub mod dispatcher;
pub mod error;
pub mod outcome;
pub mod params;
pub mod prelude;
pub mod procedure;
pub mod request;
pub mod response;
pub mod types;

// Re-export main types
pub use coerce::{ArgShape, ArgValue, CoerceError};
pub use dispatch::{IncomingMessage, parse_json_rpc_body};
pub use dispatcher::{DispatchReply, JsonRpcDispatcher};
pub use error::{JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject};
pub use outcome::{BadInput, ErrorClass, ProcedureError, ToJsonRpcError};
pub use params::{BoundArgs, ParamsError};
pub use procedure::{ArgSpec, CallContext, MethodTable, Procedure, RpcMethod, TableError, Transport};
pub use request::{JsonRpcRequest, RequestParams};
pub use response::{JsonRpcMessage, JsonRpcResponse, ResponseResult};
pub use types::{JsonRpcVersion, RequestId, URI_CLIENT_REQUEST_ID};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
