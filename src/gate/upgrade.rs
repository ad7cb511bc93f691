//! Protocol-upgrade detection.
//!
//! Upgrade traffic cannot be buffered and replayed as a plain
//! request/response pair, so it skips inspection.

use axum::http::{header, HeaderMap};

/// True when any `Upgrade` header value is exactly `websocket`.
///
/// The comparison is case-sensitive.
pub fn is_websocket(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::UPGRADE)
        .iter()
        .any(|value| value.as_bytes() == b"websocket")
}
