//! Procedure descriptors and the method table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::coerce::{ArgShape, ArgValue};
use crate::outcome::ProcedureError;
use crate::params::BoundArgs;
use crate::types::RequestId;

/// Declared argument of a procedure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    pub shape: ArgShape,
    /// Optional arguments bind [`ArgValue::Absent`] when missing instead of
    /// the shape's zero value.
    pub optional: bool,
}

impl ArgSpec {
    pub fn new(name: impl Into<String>, shape: ArgShape) -> Self {
        Self {
            name: name.into(),
            shape,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn zero_value(&self) -> ArgValue {
        if self.optional {
            ArgValue::Absent
        } else {
            self.shape.zero_value()
        }
    }
}

/// Which wire encoding a call arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// HTTP query-string call (`GET /method?arg=value`)
    Uri,
    /// JSON-RPC request object, possibly inside a batch
    JsonRpc,
}

/// Call-scoped context handed to every procedure invocation.
///
/// The cancellation token is the only cancellation channel: transports cancel
/// it when the inbound request goes away. The dispatcher itself never does.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub transport: Transport,
    /// Id of the JSON-RPC request being served, if any
    pub request_id: Option<RequestId>,
    /// Transport metadata (HTTP method, path, host, remote address)
    pub metadata: HashMap<String, Value>,
    cancellation: CancellationToken,
}

impl CallContext {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            request_id: None,
            metadata: HashMap::new(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_request_id(mut self, id: RequestId) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once the originating request has been abandoned.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }
}

/// A server-side callable exposed over the wire.
#[async_trait]
pub trait Procedure: Send + Sync {
    /// Invoke with the call context and arguments bound in declaration order.
    async fn call(&self, ctx: CallContext, args: BoundArgs) -> Result<Value, ProcedureError>;
}

/// Adapts a closure returning a boxed future into a [`Procedure`]
pub struct FnProcedure<F> {
    f: F,
}

impl<F> FnProcedure<F>
where
    F: Fn(CallContext, BoundArgs) -> BoxFuture<'static, Result<Value, ProcedureError>>
        + Send
        + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Procedure for FnProcedure<F>
where
    F: Fn(CallContext, BoundArgs) -> BoxFuture<'static, Result<Value, ProcedureError>>
        + Send
        + Sync,
{
    async fn call(&self, ctx: CallContext, args: BoundArgs) -> Result<Value, ProcedureError> {
        (self.f)(ctx, args).await
    }
}

/// Descriptor of one registered method.
#[derive(Clone)]
pub struct RpcMethod {
    name: String,
    args: Vec<ArgSpec>,
    streaming_only: bool,
    procedure: Arc<dyn Procedure>,
}

impl RpcMethod {
    pub fn new<P>(name: impl Into<String>, procedure: P) -> Self
    where
        P: Procedure + 'static,
    {
        Self {
            name: name.into(),
            args: Vec::new(),
            streaming_only: false,
            procedure: Arc::new(procedure),
        }
    }

    /// Register a closure as the procedure body.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(CallContext, BoundArgs) -> BoxFuture<'static, Result<Value, ProcedureError>>
            + Send
            + Sync
            + 'static,
    {
        Self::new(name, FnProcedure::new(f))
    }

    pub fn arg(mut self, name: impl Into<String>, shape: ArgShape) -> Self {
        self.args.push(ArgSpec::new(name, shape));
        self
    }

    pub fn optional_arg(mut self, name: impl Into<String>, shape: ArgShape) -> Self {
        self.args.push(ArgSpec::new(name, shape).optional());
        self
    }

    /// Mark the method as reachable only over a persistent-connection transport.
    pub fn streaming_only(mut self) -> Self {
        self.streaming_only = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    pub fn arg_names(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(|a| a.name.as_str())
    }

    pub fn is_streaming_only(&self) -> bool {
        self.streaming_only
    }

    pub async fn invoke(&self, ctx: CallContext, args: BoundArgs) -> Result<Value, ProcedureError> {
        self.procedure.call(ctx, args).await
    }
}

impl fmt::Debug for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcMethod")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("streaming_only", &self.streaming_only)
            .finish_non_exhaustive()
    }
}

/// Registration mistakes caught when building a [`MethodTable`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("method {0:?} is already registered")]
    DuplicateMethod(String),

    #[error("method {method:?} declares argument {arg:?} twice")]
    DuplicateArgument { method: String, arg: String },
}

/// Immutable-after-startup mapping from method name to descriptor.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    methods: HashMap<String, Arc<RpcMethod>>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, method: RpcMethod) -> Result<(), TableError> {
        if self.methods.contains_key(method.name()) {
            return Err(TableError::DuplicateMethod(method.name().to_string()));
        }
        for (i, arg) in method.args.iter().enumerate() {
            if method.args[..i].iter().any(|prev| prev.name == arg.name) {
                return Err(TableError::DuplicateArgument {
                    method: method.name().to_string(),
                    arg: arg.name.clone(),
                });
            }
        }
        self.methods
            .insert(method.name().to_string(), Arc::new(method));
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, method: RpcMethod) -> Result<Self, TableError> {
        self.register(method)?;
        Ok(self)
    }

    /// Look up any registered method, streaming-only ones included.
    pub fn get(&self, name: &str) -> Option<&Arc<RpcMethod>> {
        self.methods.get(name)
    }

    /// Look up a method callable over plain HTTP.
    pub fn resolve(&self, name: &str) -> Option<&Arc<RpcMethod>> {
        self.methods.get(name).filter(|m| !m.is_streaming_only())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RpcMethod>> {
        self.methods.values()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
