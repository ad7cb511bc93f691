//! Relaying a blocking verdict to the client.
//!
//! Headers are copied with set semantics: each value overwrites the
//! previous one stored under the same name, so a name repeated in the
//! verdict response keeps only its last value. Status and body pass
//! through untouched; the body is streamed, not buffered.

use axum::{body::Body, http::Response};

/// Build the client response from the decision service's response.
pub fn relay(verdict: Response<Body>) -> Response<Body> {
    let (parts, body) = verdict.into_parts();

    let mut response = Response::new(body);
    *response.status_mut() = parts.status;

    let headers = response.headers_mut();
    for (name, value) in parts.headers.iter() {
        headers.insert(name.clone(), value.clone());
    }

    response
}
