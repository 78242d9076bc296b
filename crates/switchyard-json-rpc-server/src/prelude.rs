//! # JSON-RPC Dispatch Prelude
//!
//! Re-exports of the types needed to declare and serve procedures.
//!
//! ```rust
//! use switchyard_json_rpc_server::prelude::*;
//! ```

// Procedure declaration
pub use crate::coerce::{ArgShape, ArgValue};
pub use crate::outcome::{BadInput, ProcedureError};
pub use crate::params::BoundArgs;
pub use crate::procedure::{CallContext, MethodTable, Procedure, RpcMethod, Transport};

// Dispatch and wire types
pub use crate::dispatcher::{DispatchReply, JsonRpcDispatcher};
pub use crate::error::{JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject};
pub use crate::request::JsonRpcRequest;
pub use crate::response::{JsonRpcMessage, JsonRpcResponse, ResponseResult};
pub use crate::types::{JsonRpcVersion, RequestId};

// Standard error codes
pub use crate::error_codes::*;
