//! Demo node: fixed `Tom`/`Jack`/`Sam` backing store, a `scores` group with
//! an 8KB budget, and a fixed three-node peer ring on localhost. Reproduces
//! the original's `main.go` demo, generalized into a CLI so any of the three
//! peer ports can be started as its own process.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use clap::Parser;

use gocache_common::GoCacheError;
use gocache_core::registry;
use gocache_peer::HttpPeerPicker;

const DEFAULT_PEER_PORTS: [u16; 3] = [8001, 8002, 8003];
const GROUP_NAME: &str = "scores";
const GROUP_BYTES: usize = 2 << 10;

#[derive(Parser, Debug)]
#[command(about = "gocache demo node")]
struct Args {
    /// Port this node's peer listener binds to.
    #[arg(long, default_value_t = 8001)]
    port: u16,

    /// Also start the public API server.
    #[arg(long, default_value_t = false)]
    api: bool,

    /// Port the public API server binds to.
    #[arg(long, default_value_t = 9999)]
    api_port: u16,

    /// Peer ports making up the cluster. Defaults to 8001, 8002, 8003.
    #[arg(long)]
    peer: Vec<u16>,
}

fn backing_store() -> HashMap<&'static str, &'static str> {
    HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let peer_ports = if args.peer.is_empty() {
        DEFAULT_PEER_PORTS.to_vec()
    } else {
        args.peer.clone()
    };

    let db = backing_store();
    registry::new_group(
        GROUP_NAME,
        GROUP_BYTES,
        Box::new(move |key: &str| {
            tracing::info!(key, "loading from backing store");
            db.get(key)
                .map(|value| value.as_bytes().to_vec())
                .ok_or_else(|| GoCacheError::NotFound(key.to_string()))
        }),
    );

    let self_url = format!("http://localhost:{}/_gocache/", args.port);
    let peer_urls: Vec<String> = peer_ports
        .iter()
        .map(|port| format!("http://localhost:{port}/_gocache/"))
        .collect();

    let picker = Arc::new(HttpPeerPicker::new(self_url, &peer_urls));
    registry::get_group(GROUP_NAME)
        .expect("scores group was just registered")
        .register_peers(picker);

    if args.api {
        tokio::spawn(run_api_server(args.api_port));
    }

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    tracing::info!(port = args.port, "gocache peer listening");
    axum::serve(listener, gocache_peer::server::router("/_gocache/")).await?;

    Ok(())
}

async fn run_api_server(port: u16) -> anyhow::Result<()> {
    let app = Router::new().route("/api", get(handle_api));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "gocache api listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn handle_api(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let Some(key) = params.get("key") else {
        return (StatusCode::BAD_REQUEST, "missing key".to_string()).into_response();
    };

    let Some(group) = registry::get_group(GROUP_NAME) else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "group not registered".to_string(),
        )
            .into_response();
    };

    match group.get(key) {
        Ok(value) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            value.to_vec(),
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}
