//! Verdict arbitration.
//!
//! # Rules
//! ```text
//! status < 400          → Allow
//! 400 <= status < 500   → Block (never overridden)
//! status >= 500         → Block, or Allow when ignore_500_error is set
//! ```
//!
//! A 4xx means the decision service caught something in the request; a 5xx
//! means the decision service itself is unhealthy, which operators may
//! choose to tolerate.

use axum::http::StatusCode;

/// What the gate does with a request once a verdict arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Forward the request to the upstream.
    Allow,
    /// Relay the decision service's response to the client.
    Block,
}

impl Verdict {
    /// Label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Allow => "allow",
            Verdict::Block => "block",
        }
    }
}

/// Map a verdict status code to an outcome.
pub fn arbitrate(status: StatusCode, ignore_500_error: bool) -> Verdict {
    if status.as_u16() >= 500 {
        if ignore_500_error {
            Verdict::Allow
        } else {
            Verdict::Block
        }
    } else if status.as_u16() >= 400 {
        Verdict::Block
    } else {
        Verdict::Allow
    }
}
