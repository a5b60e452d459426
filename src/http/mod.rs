//! Relay HTTP front.
//!
//! # Data Flow
//! ```text
//! Inbound call
//!     → server.rs (Axum router, middleware)
//!     → request.rs (request ID, header selection)
//!     → dispatcher (failover across the endpoint pool)
//!     → response.rs (upstream response or 502/504)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{shutdown_signal, AppState, RelayServer};
