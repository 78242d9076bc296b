//! Test Helpers Module for switchyard integration tests
//!
//! Boots a real server on an ephemeral port with a small method table.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use switchyard_http_server::{HttpRpcServer, HttpRpcServerBuilder};
use switchyard_json_rpc_server::prelude::*;

/// A server running in the background for the duration of one test
pub struct RunningServer {
    pub addr: SocketAddr,
    pub calls: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

#[allow(dead_code)]
impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn sample_methods(calls: &Arc<AtomicUsize>) -> HttpRpcServerBuilder {
    let health_calls = Arc::clone(calls);
    let block_calls = Arc::clone(calls);
    let whoami_calls = Arc::clone(calls);

    HttpRpcServer::builder()
        .register(RpcMethod::from_fn("health", move |_ctx, _args| {
            health_calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(json!({})) }.boxed()
        }))
        .register(
            RpcMethod::from_fn("block", move |_ctx, args| {
                block_calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    match args.get("height").and_then(ArgValue::as_i64) {
                        Some(h) if h <= 0 => Err(BadInput::ZeroOrNegativeHeight.into()),
                        Some(h) => Ok(json!({"height": h})),
                        None => Ok(json!({"height": "latest"})),
                    }
                }
                .boxed()
            })
            .optional_arg("height", ArgShape::Integer),
        )
        .register(RpcMethod::from_fn("whoami", move |ctx, _args| {
            whoami_calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(json!({
                    "remote_addr": ctx.metadata_str("remote_addr"),
                    "transport": format!("{:?}", ctx.transport),
                }))
            }
            .boxed()
        }))
        .register(
            RpcMethod::from_fn("subscribe", |_ctx, _args| async { Ok(json!({})) }.boxed())
                .arg("query", ArgShape::Text)
                .streaming_only(),
        )
}

/// Start the sample server with extra builder settings applied.
pub async fn spawn_server_with(
    configure: impl FnOnce(HttpRpcServerBuilder) -> HttpRpcServerBuilder,
) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");

    let calls = Arc::new(AtomicUsize::new(0));
    let server = configure(sample_methods(&calls))
        .bind_address(addr)
        .build()
        .expect("server should build");

    let handle = tokio::spawn(async move {
        if let Err(err) = server.serve(listener).await {
            tracing::error!("test server stopped: {}", err);
        }
    });

    RunningServer {
        addr,
        calls,
        handle,
    }
}

#[allow(dead_code)]
pub async fn spawn_server() -> RunningServer {
    spawn_server_with(|b| b).await
}
