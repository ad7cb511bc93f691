//! Gate error taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

/// Boxed error used for failures coming from bodies and transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures the gate resolves through its error policy.
///
/// None of these ever reach the host: they end either in a terse
/// 413/502 response or in a fail-open call to the upstream.
#[derive(Debug, Error)]
pub enum GateError {
    /// The inbound body is larger than the capture ceiling.
    #[error("body max limit reached: request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The inbound body could not be read.
    #[error("fail to read incoming request: {0}")]
    BodyRead(#[source] BoxError),

    /// The verdict call did not complete (timeout, refused, DNS, bad URL).
    #[error("fail to send HTTP request to modsec: {0}")]
    Transport(#[source] BoxError),

    /// Any other fault inside the pipeline.
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl GateError {
    /// Status written to the client when the gate interrupts.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GateError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GateError::BodyTooLarge { .. } => "body_too_large",
            GateError::BodyRead(_) => "body_read",
            GateError::Transport(_) => "transport",
            GateError::Unexpected(_) => "unexpected",
        }
    }
}
