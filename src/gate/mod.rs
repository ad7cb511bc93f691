//! ModSecurity inspection gate.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → upgrade.rs (websocket? forward untouched)
//!     → capture.rs (buffer body up to max_body_size)
//!     → verdict.rs (mirror request to the decision service)
//!     → arbiter.rs (status code → Allow | Block)
//!     → Allow: upstream service
//!     → Block: relay.rs (decision service response to client)
//!     → any failure: policy.rs (413/502 or fail open)
//! ```
//!
//! # Design Decisions
//! - The gate is a tower layer, so any tower/axum stack can host it
//! - The verdict transport is injected; `HttpTransport` is the default
//! - Failures are values, resolved in one place by the error policy

pub mod arbiter;
pub mod capture;
pub mod error;
pub mod layer;
pub mod policy;
pub mod relay;
pub mod upgrade;
pub mod verdict;

use axum::http::HeaderMap;

pub use arbiter::Verdict;
pub use error::GateError;
pub use layer::{ModSecurity, ModSecurityLayer};
pub use verdict::{HeaderFilter, HttpTransport, VerdictRequest, VerdictTransport};

/// Request ID set by the host, or "unknown".
pub(crate) fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
