//! CORS (Cross-Origin Resource Sharing) support

use hyper::header::HeaderValue;
use hyper::{HeaderMap, StatusCode};

use crate::responses::{RpcBody, empty_response};

/// CORS layer for adding appropriate headers
pub struct CorsLayer;

impl CorsLayer {
    /// Apply CORS headers to a response
    pub fn apply_cors_headers(headers: &mut HeaderMap) {
        headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
        headers.insert(
            "Access-Control-Allow-Methods",
            HeaderValue::from_static("GET, POST, OPTIONS"),
        );
        headers.insert(
            "Access-Control-Allow-Headers",
            HeaderValue::from_static("Content-Type, Accept, Authorization"),
        );
        headers.insert("Access-Control-Max-Age", HeaderValue::from_static("86400"));
    }

    /// Answer an OPTIONS preflight request
    pub fn preflight_response() -> hyper::Response<RpcBody> {
        let mut response = empty_response(StatusCode::OK);
        Self::apply_cors_headers(response.headers_mut());
        response
    }
}
