//! ModSecurity inspection gate.
//!
//! Mirrors every request to a ModSecurity-style decision service and, from
//! its verdict, forwards the request, relays the block, or applies the
//! configured failure policy.

pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::{GateServerConfig, ModSecurityConfig};
pub use gate::{GateError, ModSecurity, ModSecurityLayer};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
