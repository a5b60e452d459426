//! Cyclic endpoint pool.
//!
//! # Responsibilities
//! - Hold the ordered list of endpoint prefixes
//! - Track which prefix is currently favored
//! - Rotate to the next prefix when a caller reports a failure

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Built-in intermediary prefixes used when configuration names none.
pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://corsproxy.io/?",
    "https://api.allorigins.win/raw?url=",
    "https://api.codetabs.com/v1/proxy?quest=",
];

/// Handle to the single process-wide pool.
pub type SharedPool = Arc<EndpointPool>;

/// Errors raised while constructing a pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The pool was given no endpoints at all.
    #[error("endpoint pool requires at least one endpoint")]
    EmptyPool,

    /// An endpoint prefix is not an absolute http(s) URL.
    #[error("invalid endpoint prefix '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Ordered, cyclic list of endpoint prefixes with a shared cursor.
#[derive(Debug)]
pub struct EndpointPool {
    endpoints: Vec<String>,
    cursor: AtomicUsize,
}

/// Point-in-time view of the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub endpoints: Vec<String>,
    pub cursor: usize,
    pub current: String,
}

impl EndpointPool {
    /// Build a pool, failing fast on an empty or malformed list.
    pub fn new<I, S>(endpoints: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let endpoints: Vec<String> = endpoints.into_iter().map(Into::into).collect();
        if endpoints.is_empty() {
            return Err(ConfigurationError::EmptyPool);
        }

        for endpoint in &endpoints {
            validate_prefix(endpoint)?;
        }

        tracing::debug!(count = endpoints.len(), first = %endpoints[0], "Endpoint pool created");

        Ok(Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Wrap into the shared handle handed to dispatchers.
    pub fn shared(self) -> SharedPool {
        Arc::new(self)
    }

    /// The prefix at the cursor.
    pub fn current(&self) -> &str {
        &self.endpoints[self.cursor()]
    }

    /// Move the cursor one step forward (wrapping) and return the new current prefix.
    ///
    /// The increment is a single atomic read-modify-write, so concurrent
    /// callers each contribute exactly one step.
    pub fn advance(&self) -> &str {
        let len = self.endpoints.len();
        let previous = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
        {
            Ok(c) | Err(c) => c,
        };
        let next = (previous + 1) % len;
        &self.endpoints[next]
    }

    /// Current cursor index.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always false; construction rejects empty pools.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let cursor = self.cursor();
        PoolSnapshot {
            endpoints: self.endpoints.clone(),
            cursor,
            current: self.endpoints[cursor].clone(),
        }
    }
}

pub(crate) fn validate_prefix(endpoint: &str) -> Result<(), ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let parsed = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}
