//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, pool and relay server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the relay server's logs
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
