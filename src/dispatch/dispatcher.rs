//! Failover dispatcher.
//!
//! # Responsibilities
//! - Compose `current endpoint prefix + target URL` for each attempt
//! - Advance the shared pool on every transport failure
//! - Stop at the first response, or after one attempt per endpoint
//!
//! # Design Decisions
//! - The cursor is re-read before every attempt, so concurrent failures
//!   from other dispatches shift this call's rotation too
//! - Only the final attempt's error reaches the caller, unchanged
//! - HTTP error statuses are responses, not failures

use std::time::Instant;

use crate::dispatch::request::DispatchRequest;
use crate::dispatch::transport::{Transport, TransportError};
use crate::endpoint::SharedPool;
use crate::observability::metrics;
use crate::resilience::backoff::BackoffPolicy;

/// How an attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Issued, no result yet.
    Pending,
    /// The endpoint answered with a response.
    Responded,
    Failed(TransportError),
}

/// One transport attempt within a dispatch. Never outlives the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchAttempt {
    /// 1-based attempt number.
    pub number: usize,
    pub endpoint: String,
    pub target: String,
    pub outcome: AttemptOutcome,
}

impl DispatchAttempt {
    fn new(number: usize, endpoint: &str, url: &str) -> Self {
        Self {
            number,
            endpoint: endpoint.to_string(),
            target: format!("{}{}", endpoint, url),
            outcome: AttemptOutcome::Pending,
        }
    }

    fn record_success(&mut self) {
        self.outcome = AttemptOutcome::Responded;
        tracing::debug!(attempt = self.number, endpoint = %self.endpoint, "Endpoint responded");
        metrics::record_attempt(&self.endpoint, "success");
    }

    fn record_failure(&mut self, error: &TransportError) {
        self.outcome = AttemptOutcome::Failed(error.clone());
        tracing::warn!(
            attempt = self.number,
            endpoint = %self.endpoint,
            error = %error,
            "Endpoint failed, rotating pool"
        );
        metrics::record_attempt(&self.endpoint, "failure");
    }
}

/// Sends requests through the shared endpoint pool with failover.
#[derive(Debug)]
pub struct Dispatcher<T> {
    pool: SharedPool,
    transport: T,
    backoff: BackoffPolicy,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(pool: SharedPool, transport: T) -> Self {
        Self {
            pool,
            transport,
            backoff: BackoffPolicy::none(),
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn pool(&self) -> &SharedPool {
        &self.pool
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request`, failing over across the pool.
    ///
    /// Makes at most `pool.len()` attempts. On exhaustion the last
    /// attempt's error is returned as-is. An empty target is rejected
    /// before any attempt and leaves the cursor alone.
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<T::Response, TransportError> {
        if request.url.is_empty() {
            return Err(TransportError::InvalidRequest {
                url: String::new(),
                reason: "target url is empty".into(),
            });
        }

        let start = Instant::now();
        let max_attempts = self.pool.len();
        let mut number = 0;

        tracing::debug!(url = %request.url, method = %request.options.method, "Dispatching request");

        loop {
            number += 1;
            let mut attempt = DispatchAttempt::new(number, self.pool.current(), &request.url);

            match self.transport.send(&attempt.target, &request.options).await {
                Ok(response) => {
                    attempt.record_success();
                    metrics::record_dispatch("success", number, start);
                    return Ok(response);
                }
                Err(error) => {
                    attempt.record_failure(&error);
                    let next = self.pool.advance();
                    metrics::record_advance(self.pool.cursor());

                    if number >= max_attempts {
                        tracing::error!(
                            url = %request.url,
                            attempts = number,
                            error = %error,
                            "All endpoints failed"
                        );
                        metrics::record_dispatch("exhausted", number, start);
                        return Err(error);
                    }

                    let delay = self.backoff.delay(number as u32);
                    tracing::debug!(next = %next, delay = ?delay, "Retrying with next endpoint");
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}
