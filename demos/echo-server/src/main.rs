//! # Echo Server Demo
//!
//! Serves a handful of chain-flavoured sample procedures over both URI and
//! JSON-RPC calls.
//!
//! ```text
//! curl 'http://127.0.0.1:26657/block?height=3'
//! curl -X POST http://127.0.0.1:26657/ -d '{"jsonrpc":"2.0","id":1,"method":"status"}'
//! curl -X POST http://127.0.0.1:26657/      # endpoint list
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use futures::FutureExt;
use serde_json::{Value, json};
use tracing::info;

use switchyard_http_server::HttpRpcServer;
use switchyard_json_rpc_server::prelude::*;

const VALIDATORS: [&str; 5] = ["alpha", "bravo", "charlie", "delta", "echo"];

#[derive(Parser)]
#[command(name = "echo-server")]
#[command(about = "Sample procedures served over URI and JSON-RPC calls")]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:26657")]
    bind: SocketAddr,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = 1024 * 1024)]
    max_body_size: usize,

    /// Maximum number of requests in one JSON-RPC batch
    #[arg(long)]
    max_batch_size: Option<usize>,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,
}

/// Fake chain state; the height advances on every `status` call.
#[derive(Default)]
struct Chain {
    height: AtomicI64,
}

impl Chain {
    fn latest(&self) -> i64 {
        self.height.load(Ordering::SeqCst)
    }

    fn resolve_height(&self, requested: &ArgValue) -> Result<i64, ProcedureError> {
        let latest = self.latest();
        match requested.as_i64() {
            None => Ok(latest),
            Some(h) if h <= 0 => Err(BadInput::ZeroOrNegativeHeight.into()),
            Some(h) if h > latest => Err(ProcedureError::internal(format!(
                "height {} must be less than or equal to the current blockchain height {}",
                h, latest
            ))),
            Some(h) => Ok(h),
        }
    }
}

/// `validators` as a [`Procedure`] impl, to show the trait route.
struct Validators {
    chain: Arc<Chain>,
}

#[async_trait]
impl Procedure for Validators {
    async fn call(&self, _ctx: CallContext, args: BoundArgs) -> Result<Value, ProcedureError> {
        let height = self
            .chain
            .resolve_height(args.get("height").unwrap_or(&ArgValue::Absent))?;

        let per_page = args.get("per_page").and_then(ArgValue::as_i64).unwrap_or(30);
        if per_page <= 0 {
            return Err(ProcedureError::bad_input(
                BadInput::ZeroOrNegativePerPage,
                format!("per_page {}", per_page),
            ));
        }
        let per_page = per_page as usize;

        let pages = VALIDATORS.len().div_ceil(per_page).max(1);
        let page = args.get("page").and_then(ArgValue::as_i64).unwrap_or(1);
        if page <= 0 || page as usize > pages {
            return Err(ProcedureError::bad_input(
                BadInput::PageOutOfRange,
                format!("page should be within [1, {}] range, given {}", pages, page),
            ));
        }

        let start = (page as usize - 1) * per_page;
        let validators: Vec<&str> = VALIDATORS.iter().copied().skip(start).take(per_page).collect();
        Ok(json!({
            "block_height": height,
            "validators": validators,
            "count": validators.len(),
            "total": VALIDATORS.len(),
        }))
    }
}

fn methods(chain: Arc<Chain>) -> Vec<RpcMethod> {
    let status_chain = Arc::clone(&chain);
    let block_chain = Arc::clone(&chain);

    vec![
        RpcMethod::from_fn("health", |_ctx, _args| async { Ok(json!({})) }.boxed()),
        RpcMethod::from_fn("status", move |_ctx, _args| {
            let height = status_chain.height.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                Ok(json!({
                    "node_info": {"version": env!("CARGO_PKG_VERSION")},
                    "sync_info": {"latest_block_height": height.to_string()},
                }))
            }
            .boxed()
        }),
        RpcMethod::from_fn("block", move |_ctx, args| {
            let resolved = block_chain.resolve_height(args.get("height").unwrap_or(&ArgValue::Absent));
            async move {
                let height = resolved?;
                Ok(json!({"block": {"header": {"height": height.to_string()}}}))
            }
            .boxed()
        })
        .optional_arg("height", ArgShape::Integer),
        RpcMethod::new("validators", Validators { chain })
            .optional_arg("height", ArgShape::Integer)
            .optional_arg("page", ArgShape::Integer)
            .optional_arg("per_page", ArgShape::Integer),
        RpcMethod::from_fn("abci_query", |_ctx, args| {
            async move {
                let path = args.get("path").and_then(ArgValue::as_str).unwrap_or_default();
                let data = args.get("data").and_then(ArgValue::as_bytes).unwrap_or_default();
                if path.is_empty() {
                    return Err(ProcedureError::bad_input(BadInput::InvalidRequest, "empty query path"));
                }
                Ok(json!({
                    "response": {
                        "key": path,
                        "value": String::from_utf8_lossy(data),
                        "proof_requested": args.get("prove").and_then(ArgValue::as_bool),
                        "height": args.get("height").and_then(ArgValue::as_i64),
                    }
                }))
            }
            .boxed()
        })
        .arg("path", ArgShape::Text)
        .arg("data", ArgShape::Bytes)
        .arg("height", ArgShape::Integer)
        .arg("prove", ArgShape::Bool),
        RpcMethod::from_fn("sleep", |ctx, args| {
            async move {
                let ms = args.get("ms").and_then(ArgValue::as_i64).unwrap_or_default().max(0);
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(ms as u64)) => Ok(json!({"slept_ms": ms})),
                    _ = ctx.cancelled() => {
                        info!("sleep abandoned by client after cancellation");
                        Err(ProcedureError::internal("request cancelled"))
                    }
                }
            }
            .boxed()
        })
        .arg("ms", ArgShape::Integer),
        RpcMethod::from_fn("subscribe", |_ctx, _args| {
            async { Err(ProcedureError::internal("subscriptions require a streaming transport")) }.boxed()
        })
        .arg("query", ArgShape::Text)
        .streaming_only(),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let chain = Arc::new(Chain::default());
    let mut builder = HttpRpcServer::builder()
        .bind_address(args.bind)
        .cors(!args.no_cors)
        .max_body_size(args.max_body_size)
        .max_batch_size(args.max_batch_size);
    for method in methods(chain) {
        builder = builder.register(method);
    }
    let server = builder.build()?;

    info!("Endpoint list at http://{}/", args.bind);
    server.run().await?;
    Ok(())
}
