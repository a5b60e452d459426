//! relay-dispatch
//!
//! Sends HTTP requests through a rotating pool of intermediary endpoints,
//! failing over to the next endpoint whenever one errors.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!   fetch / relay ───▶│  query builder ─▶ dispatcher ─▶ transport ───────┼──▶ endpoint N + target
//!                     │                     │   ▲                        │
//!                     │        advance on   ▼   │ current prefix         │
//!                     │        failure   ┌──────────────┐                │
//!                     │                  │ endpoint pool │ (shared)      │
//!                     │                  └──────────────┘                │
//!                     │  config · logging · metrics · backoff            │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use reqwest::Method;
use tokio::net::TcpListener;

use relay_dispatch::config::{load_config, RelayConfig};
use relay_dispatch::dispatch::{
    build_url, DispatchRequest, Dispatcher, QueryParams, QueryValue, ReqwestTransport, RequestOptions,
};
use relay_dispatch::endpoint::EndpointPool;
use relay_dispatch::http::{shutdown_signal, RelayServer};
use relay_dispatch::observability::{logging, metrics};
use relay_dispatch::resilience::backoff::BackoffPolicy;

#[derive(Parser)]
#[command(name = "relay-dispatch")]
#[command(about = "Send HTTP requests through a failover pool of relay endpoints", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay HTTP server
    Serve {
        /// Override server.bind_address
        #[arg(long)]
        bind: Option<String>,
    },
    /// Dispatch a single request and print the response body
    Fetch {
        /// Target URL
        url: String,
        /// Query parameter to append (key=value), repeatable
        #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// Request header ('Name: value'), repeatable
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
        /// Request body
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Print the configured endpoint pool
    Endpoints,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected 'Name: value', got '{}'", s))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!(
        endpoints = config.endpoints.prefixes.len(),
        timeout_secs = config.transport.timeout_secs,
        backoff_base_ms = config.backoff.base_delay_ms,
        "Configuration loaded"
    );

    // The one pool for this process; every dispatcher shares it.
    let pool = EndpointPool::new(config.endpoints.prefixes.clone())?.shared();

    if let Commands::Endpoints = cli.command {
        println!("{}", serde_json::to_string_pretty(&pool.snapshot())?);
        return Ok(());
    }

    let transport = ReqwestTransport::new(&config.transport)?;
    let dispatcher = Dispatcher::new(pool, transport).with_backoff(BackoffPolicy::from_config(&config.backoff));

    match cli.command {
        Commands::Serve { bind } => {
            if config.observability.metrics_enabled {
                match config.observability.metrics_address.parse() {
                    Ok(addr) => {
                        if let Err(e) = metrics::init_metrics(addr) {
                            tracing::error!(error = %e, "Failed to start metrics exporter");
                        }
                    }
                    Err(e) => tracing::error!(
                        metrics_address = %config.observability.metrics_address,
                        error = %e,
                        "Failed to parse metrics address"
                    ),
                }
            }

            let bind = bind.unwrap_or_else(|| config.server.bind_address.clone());
            let listener = TcpListener::bind(&bind).await?;
            let server = RelayServer::new(&config.server, Arc::new(dispatcher));
            server.run(listener, shutdown_signal()).await?;
        }
        Commands::Fetch {
            url,
            params,
            method,
            headers,
            data,
        } => {
            let params: QueryParams = params
                .into_iter()
                .map(|(k, v)| (k, Some(QueryValue::Str(v))))
                .collect();
            let target = build_url(&url, &params);

            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let mut options = RequestOptions::default().method(method);
            for (name, value) in headers {
                options = options.header(name, value);
            }
            if let Some(data) = data {
                options = options.body(data);
            }

            let response = dispatcher
                .dispatch(DispatchRequest::new(target).with_options(options))
                .await?;
            eprintln!("{} via {}", response.status(), dispatcher.pool().current());
            println!("{}", response.text().await?);
        }
        Commands::Endpoints => {}
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
