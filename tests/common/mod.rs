//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use relay_dispatch::dispatch::ReqwestTransport;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A running mock endpoint and the number of requests it has served.
pub struct MockEndpoint {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockEndpoint {
    /// Prefix that routes through this endpoint, e.g. `http://127.0.0.1:PORT/fetch/`.
    pub fn prefix(&self) -> String {
        format!("http://{}/fetch/", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a mock endpoint that answers every request with `status` and a body
/// naming itself and the request target it saw.
pub async fn start_mock_endpoint(name: &'static str, status: u16) -> MockEndpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]);
                        let target = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("")
                            .to_string();
                        counter.fetch_add(1, Ordering::SeqCst);

                        let body = format!("{} saw {}", name, target);
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockEndpoint { addr, hits }
}

/// Prefix for an address that refuses connections.
pub fn dead_prefix() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/fetch/", addr)
}

/// Transport that ignores system proxies, with a short deadline.
pub fn transport() -> ReqwestTransport {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    ReqwestTransport::with_client(client, Duration::from_secs(5))
}
