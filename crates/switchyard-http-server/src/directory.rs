//! HTML directory of callable methods

use std::fmt::Write;

use switchyard_json_rpc_server::MethodTable;

use crate::protocol::html_escape;

/// Render the endpoint list served for an empty JSON-RPC body.
///
/// Methods without arguments are listed as plain links, the rest with a
/// `name=_` placeholder per declared argument. Streaming-only methods are
/// left out. Nothing is invoked.
pub fn render_endpoint_list(host: &str, methods: &MethodTable) -> String {
    let host = html_escape(host);

    let mut no_args: Vec<&str> = Vec::new();
    let mut with_args: Vec<(&str, String)> = Vec::new();
    for method in methods.iter().filter(|m| !m.is_streaming_only()) {
        if method.args().is_empty() {
            no_args.push(method.name());
        } else {
            let query = method
                .arg_names()
                .map(|arg| format!("{}=_", html_escape(arg)))
                .collect::<Vec<_>>()
                .join("&amp;");
            with_args.push((method.name(), query));
        }
    }
    no_args.sort_unstable();
    with_args.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut html = String::from("<html><body>");
    html.push_str("<br>Available endpoints:<br>");
    for name in no_args {
        let link = format!("//{}/{}", host, html_escape(name));
        let _ = write!(html, "<a href=\"{link}\">{link}</a></br>");
    }
    html.push_str("<br>Endpoints that require arguments:<br>");
    for (name, query) in with_args {
        let link = format!("//{}/{}?{}", host, html_escape(name), query);
        let _ = write!(html, "<a href=\"{link}\">{link}</a></br>");
    }
    html.push_str("</body></html>");
    html
}
