//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (SIGINT/SIGTERM):
//!     wait_for_signal → Shutdown::trigger → subscribers stop
//!
//! Server:
//!     stop accepting → drain in-flight requests → exit
//! ```

pub mod shutdown;

pub use shutdown::{wait_for_signal, Shutdown};
