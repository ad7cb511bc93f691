//! Error policy: fail closed or fail open.
//!
//! Every gate failure ends here. With `interrupt_on_error` the client gets
//! a bare status (413 for an oversized body, 502 for everything else) and
//! no detail; without it the request continues to the upstream as if it
//! had been allowed.

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
};

use crate::gate::{error::GateError, request_id};
use crate::observability::metrics;

/// How a failed request ends.
pub enum Resolution {
    /// Answer the client with this response and stop.
    Interrupt(Response<Body>),
    /// Hand the request to the upstream.
    Continue(Request<Body>),
}

/// Log `error` with the request's metadata and apply the policy.
pub fn resolve(
    gate: &str,
    error: &GateError,
    request: Request<Body>,
    interrupt_on_error: bool,
) -> Resolution {
    let request_id = request_id(request.headers());

    tracing::error!(
        gate = %gate,
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
        headers = ?request.headers(),
        kind = error.kind(),
        error = %error,
        "ModSecurity gate error"
    );
    metrics::record_error(error.kind());

    if interrupt_on_error {
        let status = error.status_code();
        tracing::info!(gate = %gate, request_id = %request_id, status = %status, "Interrupting request");
        metrics::record_outcome("interrupt");
        Resolution::Interrupt(error_response(status))
    } else {
        tracing::info!(gate = %gate, request_id = %request_id, "Continuing to upstream");
        metrics::record_outcome("continue");
        Resolution::Continue(request)
    }
}

fn error_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}
