//! Endpoint pool subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     config [endpoints].prefixes (or DEFAULT_ENDPOINTS)
//!     → pool.rs (validate, build EndpointPool)
//!     → Arc<EndpointPool> injected into every Dispatcher
//!
//! Per dispatch:
//!     → current() (read the favored prefix)
//!     → advance() on transport failure (rotate, wraps around)
//! ```
//!
//! # Design Decisions
//! - Membership is fixed for the process lifetime; only the cursor moves
//! - The cursor is shared by all callers, so failover is global
//! - Strict rotation order, no randomization or health-based reordering

pub mod pool;

pub use pool::{ConfigurationError, EndpointPool, PoolSnapshot, SharedPool, DEFAULT_ENDPOINTS};
