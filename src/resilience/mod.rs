//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt fails in the dispatcher:
//!     → pool advances to the next endpoint
//!     → backoff.rs (optional delay before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Backoff is off by default; failover is immediate
//! - Jittered backoff prevents thundering herd when enabled
//! - Timeouts belong to the transport, not to this layer

pub mod backoff;
