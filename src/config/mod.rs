//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → composition root builds the pool, transport and server from it
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; pool membership never changes afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackoffConfig, EndpointsConfig, ObservabilityConfig, RelayConfig, ServerConfig, TransportConfig,
};
