//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, or the plugin's JSON shape)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateServerConfig (validated, immutable)
//!     → ModSecurityConfig shared via Arc by every gate service clone
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a gate never observes a change
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::{
    GateServerConfig, ListenerConfig, LogFormat, ModSecurityConfig, ObservabilityConfig,
    TimeoutConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
