//! Transport boundary.
//!
//! # Responsibilities
//! - Define the capability the dispatcher calls for each attempt
//! - Provide the reqwest-backed implementation used in production
//! - Classify failures (connect, timeout, cancelled, request)
//!
//! # Design Decisions
//! - Any response, whatever its HTTP status, is a success at this layer
//! - Timeouts are enforced here, never by the dispatcher
//! - Cancellation is raced against the call and reported as a failure

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use thiserror::Error;
use tokio::time::timeout;

use crate::config::TransportConfig;
use crate::dispatch::request::RequestOptions;

/// A single failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not reach the endpoint (DNS, refused, reset).
    #[error("connection to {url} failed: {reason}")]
    Connect { url: String, reason: String },

    /// No response within the attempt deadline.
    #[error("request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    /// The caller cancelled the attempt.
    #[error("request to {url} was cancelled")]
    Cancelled { url: String },

    /// Any other failure while sending or receiving.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// Options could not be turned into a valid request.
    #[error("invalid request for {url}: {reason}")]
    InvalidRequest { url: String, reason: String },
}

impl TransportError {
    /// Classify a reqwest failure for `url`.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_connect() {
            TransportError::Connect {
                url,
                reason: err.to_string(),
            }
        } else if err.is_builder() {
            TransportError::InvalidRequest {
                url,
                reason: err.to_string(),
            }
        } else {
            TransportError::Request {
                url,
                reason: err.to_string(),
            }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            TransportError::Connect { url, .. }
            | TransportError::Timeout { url, .. }
            | TransportError::Cancelled { url }
            | TransportError::Request { url, .. }
            | TransportError::InvalidRequest { url, .. } => url,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }
}

/// Capability to send one request to one fully composed URL.
pub trait Transport: Send + Sync {
    type Response: Send;

    fn send(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Self::Response, TransportError>> + Send;
}

/// Production transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_client(client, Duration::from_secs(config.timeout_secs)))
    }

    pub fn with_client(client: reqwest::Client, default_timeout: Duration) -> Self {
        Self {
            client,
            default_timeout,
        }
    }

    fn build(&self, url: &str, options: &RequestOptions) -> Result<reqwest::RequestBuilder, TransportError> {
        let invalid = |reason: String| TransportError::InvalidRequest {
            url: url.to_string(),
            reason,
        };

        let mut builder = self.client.request(options.method.clone(), url);
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| invalid(format!("header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| invalid(format!("header '{}': {}", name, e)))?;
            builder = builder.header(name, value);
        }
        if let Some(body) = &options.body {
            builder = builder.body(body.clone());
        }
        Ok(builder)
    }
}

impl Transport for ReqwestTransport {
    type Response = reqwest::Response;

    fn send(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<reqwest::Response, TransportError>> + Send {
        let request = self.build(url, options);
        let deadline = options.timeout.unwrap_or(self.default_timeout);
        let cancel = options.cancel.clone();
        let url = url.to_string();

        async move {
            let request = request?;
            let call = timeout(deadline, request.send());

            let outcome = match cancel {
                Some(mut signal) => {
                    tokio::select! {
                        biased;
                        _ = signal.cancelled() => return Err(TransportError::Cancelled { url: url.clone() }),
                        res = call => res,
                    }
                }
                None => call.await,
            };

            match outcome {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(e)) if e.is_timeout() => Err(TransportError::Timeout { url, after: deadline }),
                Ok(Err(e)) => Err(TransportError::from_reqwest(&url, e)),
                Err(_) => Err(TransportError::Timeout { url, after: deadline }),
            }
        }
    }
}
