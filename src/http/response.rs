//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn the endpoint's response into the relay's response
//! - Map terminal dispatch failures to HTTP status codes
//!
//! # Design Decisions
//! - Upstream status codes pass through untouched, including 5xx
//! - Hop-by-hop headers stripped; content-length recomputed
//! - Endpoint timeouts result in 504 Gateway Timeout, other failures in 502

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::dispatch::TransportError;
use crate::http::request::HOP_BY_HOP;

/// Buffer the upstream body and rebuild it as an axum response.
pub async fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = strip_hop_by_hop(upstream.headers());

    match upstream.bytes().await {
        Ok(body) => (status, headers, body).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read upstream body");
            error_response(StatusCode::BAD_GATEWAY, format!("failed to read upstream body: {}", e))
        }
    }
}

/// Response for a dispatch that exhausted the pool.
pub fn transport_error_response(err: &TransportError) -> Response {
    let status = if err.is_timeout() {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::BAD_GATEWAY
    };
    error_response(status, err.to_string())
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
    headers.remove("content-length");
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_timeout_maps_to_504() {
        let err = TransportError::Timeout {
            url: "http://a.test/x".into(),
            after: Duration::from_secs(1),
        };
        let response = transport_error_response(&err);
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body_json(response).await["error"], err.to_string());
    }

    #[tokio::test]
    async fn test_connect_maps_to_502() {
        let err = TransportError::Connect {
            url: "http://a.test/x".into(),
            reason: "refused".into(),
        };
        assert_eq!(transport_error_response(&err).status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_upstream_status_and_headers_pass_through() {
        let upstream = axum::http::Response::builder()
            .status(500)
            .header("x-upstream", "yes")
            .header("transfer-encoding", "chunked")
            .body("boom")
            .unwrap();

        let response = relay_response(reqwest::Response::from(upstream)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["x-upstream"], "yes");
        assert!(response.headers().get("transfer-encoding").is_none());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"boom");
    }
}
