//! HTTP hosting subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign x-request-id)
//!     → gate (inspection, may answer directly)
//!     → upstream.rs (forward, tunnel upgrades)
//!     → Send to client
//! ```

pub mod request;
pub mod server;
pub mod upstream;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;
pub use upstream::Upstream;
