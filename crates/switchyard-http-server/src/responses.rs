//! Response builders for the handlers.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{ALLOW, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

/// Body type of every response this server writes
pub type RpcBody = Full<Bytes>;

fn finish(builder: http::response::Builder, body: Bytes) -> Response<RpcBody> {
    builder.body(Full::new(body)).unwrap_or_else(|err| {
        error!("Failed to build response: {}", err);
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

/// JSON body with status 200; wire errors are carried in the envelope.
pub fn json_response<T: Serialize>(value: &T) -> Response<RpcBody> {
    match serde_json::to_vec(value) {
        Ok(body) => finish(
            Response::builder()
                .status(StatusCode::OK)
                .header(CONTENT_TYPE, "application/json"),
            Bytes::from(body),
        ),
        Err(err) => {
            error!("Failed to serialize response: {}", err);
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

pub fn text_response(status: StatusCode, text: impl Into<String>) -> Response<RpcBody> {
    finish(
        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "text/plain"),
        Bytes::from(text.into()),
    )
}

pub fn html_response(html: String) -> Response<RpcBody> {
    finish(
        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "text/html"),
        Bytes::from(html),
    )
}

pub fn empty_response(status: StatusCode) -> Response<RpcBody> {
    finish(Response::builder().status(status), Bytes::new())
}

pub fn method_not_allowed() -> Response<RpcBody> {
    finish(
        Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header(ALLOW, "GET, POST, OPTIONS"),
        Bytes::from("Method not allowed"),
    )
}
