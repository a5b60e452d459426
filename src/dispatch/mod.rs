//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Caller
//!     → query.rs (optional: merge query params into the target)
//!     → request.rs (DispatchRequest = target + RequestOptions)
//!     → dispatcher.rs
//!         → endpoint pool: current prefix
//!         → transport.rs: send(prefix + target, options)
//!         → on failure: advance pool, try again (once per endpoint)
//!     → Response, or the last TransportError
//! ```
//!
//! # Design Decisions
//! - Transport is a trait so tests can script endpoint outcomes
//! - Options are typed; the dispatcher never looks inside them
//! - No caching, no request coalescing

pub mod cancel;
pub mod dispatcher;
pub mod query;
pub mod request;
pub mod transport;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use dispatcher::{AttemptOutcome, DispatchAttempt, Dispatcher};
pub use query::{build_url, EncodingError, QueryParams, QueryValue};
pub use request::{DispatchRequest, RequestOptions};
pub use transport::{ReqwestTransport, Transport, TransportError};
