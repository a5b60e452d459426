//! Relay HTTP server.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Turn `/relay?url=...` calls into dispatches through the shared pool
//! - Expose the pool's state at `/endpoints`

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::dispatch::{
    build_url, DispatchRequest, Dispatcher, QueryParams, QueryValue, RequestOptions, Transport,
};
use crate::http::request::{forwarded_headers, request_id, UuidRequestId};
use crate::http::response::{error_response, relay_response, transport_error_response};

/// Application state injected into handlers.
pub struct AppState<T> {
    pub dispatcher: Arc<Dispatcher<T>>,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

/// HTTP front for the dispatcher.
pub struct RelayServer {
    router: Router,
}

impl RelayServer {
    /// Build the server around an already constructed dispatcher.
    pub fn new<T>(config: &ServerConfig, dispatcher: Arc<Dispatcher<T>>) -> Self
    where
        T: Transport<Response = reqwest::Response> + 'static,
    {
        let state = AppState { dispatcher };
        Self {
            router: Self::build_router(config, state),
        }
    }

    #[allow(deprecated)]
    fn build_router<T>(config: &ServerConfig, state: AppState<T>) -> Router
    where
        T: Transport<Response = reqwest::Response> + 'static,
    {
        Router::new()
            .route("/health", get(health_handler))
            .route("/endpoints", get(endpoints_handler::<T>))
            .route("/relay", any(relay_handler::<T>))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The configured router, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Relay server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Relay server stopped");
        Ok(())
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn endpoints_handler<T>(State(state): State<AppState<T>>) -> impl IntoResponse
where
    T: Transport<Response = reqwest::Response> + 'static,
{
    Json(state.dispatcher.pool().snapshot())
}

/// Relays one inbound call through the endpoint pool.
///
/// `url` names the target; every other query parameter is merged into it,
/// repeated keys included.
async fn relay_handler<T>(
    State(state): State<AppState<T>>,
    Query(mut query): Query<Vec<(String, String)>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    T: Transport<Response = reqwest::Response> + 'static,
{
    let request_id = request_id(&headers).to_string();

    let target = query
        .iter()
        .position(|(k, v)| k == "url" && !v.is_empty())
        .map(|i| query.remove(i).1);
    let Some(target) = target else {
        tracing::warn!(request_id = %request_id, "Relay call without target url");
        return error_response(StatusCode::BAD_REQUEST, "missing 'url' query parameter");
    };
    let params: QueryParams = query
        .into_iter()
        .map(|(k, v)| (k, Some(QueryValue::Str(v))))
        .collect();
    let target = build_url(&target, &params);

    let mut options = RequestOptions::default().method(method.clone());
    options.headers = forwarded_headers(&headers);
    if !body.is_empty() {
        options = options.body(body.to_vec());
    }

    tracing::debug!(request_id = %request_id, method = %method, target = %target, "Relaying request");

    match state
        .dispatcher
        .dispatch(DispatchRequest::new(target).with_options(options))
        .await
    {
        Ok(upstream) => relay_response(upstream).await,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Relay failed on every endpoint");
            transport_error_response(&e)
        }
    }
}

/// Wait for Ctrl+C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
