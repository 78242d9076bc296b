//! URI call tests: `GET /{method}?arg=value`

use hyper::StatusCode;
use hyper::header::CONTENT_TYPE;
use serde_json::json;

use crate::tests::fixtures::{body_json, body_text, get, post, send, test_server, test_server_with};

#[tokio::test]
async fn test_zero_argument_call_invokes_once() {
    let server = test_server();
    let response = send(&server, get("/ping")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(
        body_json(response).await,
        json!({"jsonrpc": "2.0", "id": -1, "result": {}})
    );
    assert_eq!(server.calls(), 1);
}

#[tokio::test]
async fn test_quoted_and_bare_integers_agree() {
    let server = test_server();
    let bare = body_json(send(&server, get("/block?height=42")).await).await;
    let quoted = body_json(send(&server, get("/block?height=%2242%22")).await).await;

    assert_eq!(bare, quoted);
    assert_eq!(bare["result"], json!({"height": 42}));
}

#[tokio::test]
async fn test_missing_optional_argument_is_absent() {
    let server = test_server();
    let body = body_json(send(&server, get("/block")).await).await;
    assert_eq!(body["result"], json!({"height": "latest"}));
}

#[tokio::test]
async fn test_decode_failure_is_plain_400() {
    let server = test_server();
    let response = send(&server, get("/block?height=4x2")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    let text = body_text(response).await;
    assert!(text.starts_with("decoding parameter \"height\""), "{text}");
    assert!(text.ends_with('\n'));
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_byte_argument_forms() {
    let server = test_server();

    let hex = body_json(send(&server, get("/echo?data=0x48656c6c6f&prove=true")).await).await;
    assert_eq!(hex["result"]["data"], "Hello");
    assert_eq!(hex["result"]["prove"], true);
    assert_eq!(hex["result"]["path"], "/echo");

    let quoted = body_json(send(&server, get("/echo?data=%22Hello%22")).await).await;
    assert_eq!(quoted["result"]["data"], "Hello");
    assert_eq!(quoted["result"]["prove"], false);

    let bare = body_json(send(&server, get("/echo?data=Hello")).await).await;
    assert_eq!(bare["result"]["data"], "Hello");
}

#[tokio::test]
async fn test_bad_boolean_rejected() {
    let server = test_server();
    let response = send(&server, get("/echo?prove=yes")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_bad_input_is_structured_envelope() {
    let server = test_server();
    let response = send(&server, get("/block?height=0")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], -1);
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(
        body["error"]["data"],
        "height must be greater than zero: requested 0"
    );
}

#[tokio::test]
async fn test_internal_error_envelope() {
    let server = test_server();
    let body = body_json(send(&server, get("/status")).await).await;
    assert_eq!(body["error"]["code"], -32603);
    assert_eq!(body["error"]["message"], "Internal error");
    assert_eq!(body["error"]["data"], "disk full");
}

#[tokio::test]
async fn test_pass_through_error() {
    let server = test_server();
    let body = body_json(send(&server, get("/broadcast")).await).await;
    assert_eq!(
        body["error"],
        json!({"code": -32001, "message": "tx already exists in cache"})
    );
}

#[tokio::test]
async fn test_streaming_only_method_not_found() {
    let server = test_server();
    let response = send(&server, get("/subscribe?query=%22tm.event%3D'NewBlock'%22")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.is_empty());
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_unknown_path_not_found() {
    let server = test_server();
    let response = send(&server, get("/no_such_method")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Not Found");
}

#[tokio::test]
async fn test_extra_leading_slash_not_routed() {
    let server = test_server();
    let response = send(&server, get("//ping")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_form_body_takes_precedence_over_query() {
    let server = test_server();
    let response = send(
        &server,
        post(
            "/block?height=1",
            "application/x-www-form-urlencoded",
            "height=7",
        ),
    )
    .await;
    assert_eq!(body_json(response).await["result"], json!({"height": 7}));
}

#[tokio::test]
async fn test_form_body_too_large() {
    let server = test_server_with(|b| b.max_body_size(4));
    let response = send(
        &server,
        post("/block", "application/x-www-form-urlencoded", "height=12345"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(server.calls(), 0);
}

#[tokio::test]
async fn test_cors_headers_on_responses() {
    let server = test_server();
    let response = send(&server, get("/ping")).await;
    assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
}
