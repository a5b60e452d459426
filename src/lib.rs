//! Resilient multi-endpoint request dispatcher.
//!
//! Routes outbound HTTP calls through a rotating pool of intermediary
//! endpoints, failing over to the next endpoint whenever one errors.

pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod http;
pub mod observability;
pub mod resilience;

pub use config::RelayConfig;
pub use dispatch::{build_url, DispatchRequest, Dispatcher, QueryParams, RequestOptions, TransportError};
pub use endpoint::{EndpointPool, SharedPool};
pub use http::RelayServer;
