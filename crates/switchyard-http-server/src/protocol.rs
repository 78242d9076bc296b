//! Request inspection helpers shared by the handlers.

use std::net::SocketAddr;

use hyper::header::{CONTENT_TYPE, HOST};
use hyper::{HeaderMap, Request};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use switchyard_json_rpc_server::{CallContext, Transport};

/// Peer address of the connection a request arrived on, stored in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub SocketAddr);

/// Host the client addressed, from the `Host` header or the URI authority.
pub fn request_host<B>(req: &Request<B>) -> String {
    req.headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// Build the call context for a request, tied to `cancel`.
pub fn call_context<B>(req: &Request<B>, transport: Transport, cancel: CancellationToken) -> CallContext {
    let mut ctx = CallContext::new(transport)
        .with_cancellation(cancel)
        .with_metadata("http.method", Value::String(req.method().to_string()))
        .with_metadata("http.path", Value::String(req.uri().path().to_string()))
        .with_metadata("http.host", Value::String(request_host(req)));
    if let Some(RemoteAddr(addr)) = req.extensions().get::<RemoteAddr>() {
        ctx = ctx.with_metadata("remote_addr", Value::String(addr.to_string()));
    }
    ctx
}

pub fn is_form_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Decoded form parameters; body pairs come before query pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pairs: Vec<(String, String)>,
}

impl FormValues {
    pub fn parse(query: Option<&str>, body: &[u8]) -> Self {
        let pairs = url::form_urlencoded::parse(body)
            .chain(url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// First value supplied for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
