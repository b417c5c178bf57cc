//! HTTP handlers for the paste endpoints.

/// Multipart form extraction.
pub mod form;
/// Paste CRUD handlers.
pub mod paste;

use axum::http::header;
use hyper::HeaderMap;
use pastecan_core::Config;

/// Public base address used in response bodies.
///
/// `PUBLIC_URL` wins when configured; otherwise the request `Host` header is
/// echoed back, so responses stay correct behind whatever name the client
/// used to reach us.
pub(crate) fn public_addr(config: &Config, headers: &HeaderMap) -> String {
    if let Some(ref url) = config.public_url {
        return url.clone();
    }
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(|host| format!("http://{}", host))
        .unwrap_or_else(|| format!("http://localhost:{}", config.port))
}
