//! Drives a real peer listener over a real socket: spawn it on an ephemeral
//! port, then hit it with the client under test from a separate thread.

use std::net::TcpListener;

use gocache_common::GoCacheError;
use gocache_core::registry;

#[tokio::test]
async fn serves_a_value_over_a_real_socket() {
    registry::new_group(
        "roundtrip",
        0,
        Box::new(|key: &str| {
            if key == "missing" {
                Err(GoCacheError::NotFound(key.to_string()))
            } else {
                Ok(format!("value-for-{key}").into_bytes())
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();
    let listener = tokio::net::TcpListener::from_std(listener).unwrap();

    let app = gocache_peer::server::router("/_gocache/");
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base_url = format!("http://{addr}/_gocache/");
    let handle = std::thread::spawn(move || {
        let getter = gocache_peer::HttpPeerGetter::new(base_url);
        gocache_core::PeerGetter::get(&getter, "roundtrip", "hello")
    });

    let result = handle.join().unwrap();
    assert_eq!(result.unwrap(), b"value-for-hello".to_vec());
}
