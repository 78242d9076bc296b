//! JSON-RPC over `POST /` tests

use std::sync::Arc;

use hyper::header::CONTENT_TYPE;
use hyper::{Request, StatusCode};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::JsonRpcHttpHandler;
use crate::tests::fixtures::{
    body_json, body_text, get, post_json, send, test_server, test_server_with,
};

#[tokio::test]
async fn test_single_request_yields_single_object() {
    let server = test_server();
    let response = send(&server, post_json(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"jsonrpc": "2.0", "id": 1, "result": {}})
    );
}

#[tokio::test]
async fn test_batch_skips_notifications() {
    let server = test_server();
    let response = send(
        &server,
        post_json(r#"[{"id":1,"method":"ping","params":[]},{"method":"ping"}]"#),
    )
    .await;

    assert_eq!(
        body_json(response).await,
        json!([{"jsonrpc": "2.0", "id": 1, "result": {}}])
    );
    assert_eq!(server.calls(), 1);
}

#[tokio::test]
async fn test_batch_preserves_order_and_ids() {
    let server = test_server();
    let response = send(
        &server,
        post_json(
            r#"[{"id":"a","method":"block","params":{"height":3}},
                {"id":2,"method":"missing"},
                {"id":3,"method":"block","params":[-1]}]"#,
        ),
    )
    .await;

    let body = body_json(response).await;
    let replies = body.as_array().unwrap();
    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0]["id"], "a");
    assert_eq!(replies[0]["result"], json!({"height": 3}));
    assert_eq!(replies[1]["id"], 2);
    assert_eq!(replies[1]["error"]["code"], -32601);
    assert_eq!(replies[2]["id"], 3);
    assert_eq!(replies[2]["error"]["code"], -32600);
}

#[tokio::test]
async fn test_only_notifications_write_nothing() {
    let server = test_server();

    let response = send(&server, post_json(r#"[{"method":"ping"},{"method":"ping","id":null}]"#)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.is_empty());

    let response = send(&server, post_json(r#"{"method":"status"}"#)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.is_empty());
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_array_arity_mismatch_never_invokes() {
    let server = test_server();
    for params in ["[]", "[\"SGk=\"]", "[\"SGk=\", true, 3]"] {
        let body = format!(r#"{{"id":9,"method":"echo","params":{}}}"#, params);
        let reply = body_json(send(&server, post_json(&body)).await).await;
        assert_eq!(reply["error"]["code"], -32602, "{params}");
        assert_eq!(reply["id"], 9);
    }
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_named_and_positional_params_agree() {
    let server = test_server();
    let named = body_json(
        send(
            &server,
            post_json(r#"{"id":1,"method":"echo","params":{"data":"SGVsbG8=","prove":true}}"#),
        )
        .await,
    )
    .await;
    let positional = body_json(
        send(&server, post_json(r#"{"id":1,"method":"echo","params":["SGVsbG8=",true]}"#)).await,
    )
    .await;

    assert_eq!(named, positional);
    assert_eq!(named["result"]["data"], "Hello");
    assert_eq!(named["result"]["path"], "/");
}

#[tokio::test]
async fn test_quoted_integer_param() {
    let server = test_server();
    let reply = body_json(
        send(&server, post_json(r#"{"id":1,"method":"block","params":{"height":"42"}}"#)).await,
    )
    .await;
    assert_eq!(reply["result"], json!({"height": 42}));
}

#[tokio::test]
async fn test_param_type_mismatch_is_invalid_params() {
    let server = test_server();
    let reply = body_json(
        send(&server, post_json(r#"{"id":1,"method":"echo","params":{"prove":"yes"}}"#)).await,
    )
    .await;

    assert_eq!(reply["error"]["code"], -32602);
    let data = reply["error"]["data"].as_str().unwrap();
    assert!(data.starts_with("converting JSON parameters: decoding parameter \"prove\""), "{data}");
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_parse_error() {
    let server = test_server();
    let reply = body_json(send(&server, post_json(r#"{"id":1,"method":"#)).await).await;

    assert_eq!(reply["error"]["code"], -32700);
    assert_eq!(reply["error"]["message"], "Parse error");
    assert!(reply["id"].is_null());
}

#[tokio::test]
async fn test_lone_scalar_and_null_bodies() {
    let server = test_server();

    let reply = body_json(send(&server, post_json("5")).await).await;
    assert_eq!(reply["error"]["code"], -32700);
    assert!(reply["id"].is_null());

    let response = send(&server, post_json("null")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.is_empty());
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_malformed_batch_entry_does_not_abort_siblings() {
    let server = test_server();
    let body = body_json(send(&server, post_json(r#"[{"id":1,"method":"ping"},42]"#)).await).await;

    assert_eq!(body[0]["result"], json!({}));
    assert_eq!(body[1]["error"]["code"], -32600);
    assert!(body[1]["id"].is_null());
}

#[tokio::test]
async fn test_unknown_and_streaming_methods_look_the_same() {
    let server = test_server();
    let missing = body_json(send(&server, post_json(r#"{"id":1,"method":"nope"}"#)).await).await;
    let streaming = body_json(
        send(&server, post_json(r#"{"id":1,"method":"subscribe","params":{"query":"x"}}"#)).await,
    )
    .await;

    assert_eq!(missing, streaming);
    assert_eq!(missing["error"]["code"], -32601);
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_empty_body_renders_directory() {
    let server = test_server();

    for req in [post_json(""), get("/")] {
        let response = send(&server, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
        let html = body_text(response).await;
        assert!(html.contains("//localhost:26657/ping"));
        assert!(html.contains("//localhost:26657/block?height=_"));
        assert!(!html.contains("subscribe"));
    }
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_batch_limit() {
    let server = test_server_with(|b| b.max_batch_size(Some(2)));

    let ok = body_json(
        send(&server, post_json(r#"[{"id":1,"method":"ping"},{"id":2,"method":"ping"}]"#)).await,
    )
    .await;
    assert_eq!(ok.as_array().map(Vec::len), Some(2));

    let rejected = body_json(
        send(
            &server,
            post_json(r#"[{"id":1,"method":"ping"},{"id":2,"method":"ping"},{"id":3,"method":"ping"}]"#),
        )
        .await,
    )
    .await;
    assert_eq!(rejected["error"]["code"], -32600);
    assert!(rejected["id"].is_null());
    assert_eq!(server.calls(), 2);
}

#[tokio::test]
async fn test_oversized_body() {
    let server = test_server_with(|b| b.max_body_size(16));
    let response = send(&server, post_json(r#"{"id":1,"method":"ping","params":[]}"#)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_handler_rejects_other_paths() {
    let server = test_server();
    let handler = JsonRpcHttpHandler::new(Arc::new(server.router.dispatcher().clone()), 1024);
    let req = Request::builder()
        .method("POST")
        .uri("/status")
        .body(http_body_util::Full::new(bytes::Bytes::from_static(b"{}")))
        .unwrap();

    let reply = body_json(handler.handle(req, CancellationToken::new()).await).await;
    assert_eq!(reply["error"]["code"], -32600);
    assert_eq!(reply["error"]["data"], "invalid path: \"/status\"");
}

#[tokio::test]
async fn test_preflight_and_disallowed_methods() {
    let server = test_server();
    let options = Request::builder()
        .method("OPTIONS")
        .uri("/")
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .unwrap();
    let response = send(&server, options).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("Access-Control-Allow-Methods"));

    let put = Request::builder()
        .method("PUT")
        .uri("/")
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .unwrap();
    assert_eq!(send(&server, put).await.status(), StatusCode::METHOD_NOT_ALLOWED);

    let no_cors = test_server_with(|b| b.cors(false));
    let response = send(&no_cors, get("/ping")).await;
    assert!(!response.headers().contains_key("Access-Control-Allow-Origin"));
}

#[tokio::test]
async fn test_cancellation_reaches_procedure() {
    use futures::FutureExt;
    use switchyard_json_rpc_server::RpcMethod;

    let server = test_server_with(|b| {
        b.register(RpcMethod::from_fn("wait", |ctx, _args| {
            async move {
                ctx.cancelled().await;
                Ok(json!({"cancelled": ctx.is_cancelled()}))
            }
            .boxed()
        }))
    });

    let cancel = CancellationToken::new();
    cancel.cancel();
    let response = server
        .router
        .route(post_json(r#"{"id":1,"method":"wait"}"#), cancel)
        .await;
    assert_eq!(body_json(response).await["result"], json!({"cancelled": true}));
}
