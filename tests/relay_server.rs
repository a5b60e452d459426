//! End-to-end tests for the relay HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use relay_dispatch::config::ServerConfig;
use relay_dispatch::dispatch::{Dispatcher, ReqwestTransport};
use relay_dispatch::endpoint::{EndpointPool, SharedPool};
use relay_dispatch::http::RelayServer;
use tokio::net::TcpListener;

mod common;

async fn start_relay(prefixes: Vec<String>) -> (SocketAddr, SharedPool) {
    let pool = EndpointPool::new(prefixes).unwrap().shared();
    let dispatcher: Arc<Dispatcher<ReqwestTransport>> = Arc::new(Dispatcher::new(pool.clone(), common::transport()));
    let server = RelayServer::new(&ServerConfig::default(), dispatcher);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, std::future::pending()).await;
    });
    (addr, pool)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_relay_through_second_endpoint() {
    let live = common::start_mock_endpoint("live", 200).await;
    let (addr, pool) = start_relay(vec![common::dead_prefix(), live.prefix()]).await;

    let res = client()
        .get(format!("http://{}/relay", addr))
        .query(&[("url", "http://example.test/quotes"), ("symbol", "EURUSD")])
        .send()
        .await
        .expect("relay unreachable");

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(
        res.text().await.unwrap(),
        "live saw /fetch/http://example.test/quotes?symbol=EURUSD"
    );
    assert_eq!(pool.cursor(), 1);
}

#[tokio::test]
async fn test_relay_passes_upstream_errors_through() {
    let unavailable = common::start_mock_endpoint("unavailable", 503).await;
    let (addr, _) = start_relay(vec![unavailable.prefix()]).await;

    let res = client()
        .get(format!("http://{}/relay", addr))
        .query(&[("url", "http://example.test/quotes")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);
}

#[tokio::test]
async fn test_relay_exhausted_pool_is_bad_gateway() {
    let (addr, _) = start_relay(vec![common::dead_prefix(), common::dead_prefix()]).await;

    let res = client()
        .get(format!("http://{}/relay", addr))
        .query(&[("url", "http://example.test/quotes")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);

    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("connection to"));
}

#[tokio::test]
async fn test_endpoints_reports_pool() {
    let live = common::start_mock_endpoint("live", 200).await;
    let (addr, _) = start_relay(vec![live.prefix()]).await;

    let body: serde_json::Value = client()
        .get(format!("http://{}/endpoints", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["cursor"], 0);
    assert_eq!(body["current"], live.prefix());
}
