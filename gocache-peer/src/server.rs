//! HTTP peer listener implementing the wire protocol peers use to fetch keys
//! from each other: `GET {base_path}{group}/{key}`.
//!
//! A single fallback handler does the routing by hand — matching the
//! original's single `ServeHTTP` method, which checks the path prefix and
//! splits the remainder itself rather than delegating to a router — so the
//! edge cases around missing segments and embedded slashes in the key match
//! exactly. Go's `net/http` hands handlers an already percent-decoded
//! `r.URL.Path`; `axum::http::Uri::path()` does not decode, so this handler
//! decodes the path itself before splitting it, to keep the same
//! escape/unescape round trip the client side uses.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use percent_encoding::percent_decode_str;
use tower_http::trace::TraceLayer;

use gocache_core::registry;

use crate::metrics::Metrics;

#[derive(Clone)]
struct ServerState {
    base_path: String,
    metrics: Arc<Metrics>,
}

/// Builds the axum router for a peer listener rooted at `base_path` (must
/// start and end with `/`, e.g. `/_gocache/`).
pub fn router(base_path: impl Into<String>) -> Router {
    let state = ServerState {
        base_path: base_path.into(),
        metrics: Arc::new(Metrics::new()),
    };

    Router::new()
        .fallback(handle)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle(State(state): State<ServerState>, request: Request) -> Response {
    state.metrics.record_request_start();
    let started_at = Instant::now();

    let response = route(&state, request);

    if response.status().is_client_error() || response.status().is_server_error() {
        state.metrics.record_error();
    }
    state.metrics.record_request_end(started_at.elapsed());

    response
}

fn route(state: &ServerState, request: Request) -> Response {
    let Ok(decoded_path) = percent_decode_str(request.uri().path()).decode_utf8() else {
        return bad_request();
    };

    let Some(rest) = decoded_path.strip_prefix(state.base_path.as_str()) else {
        panic!(
            "gocache: peer listener received unexpected path {decoded_path} (expected prefix {})",
            state.base_path
        );
    };

    let mut parts = rest.splitn(2, '/');
    let (Some(group_name), Some(key)) = (parts.next(), parts.next()) else {
        return bad_request();
    };

    let Some(group) = registry::get_group(group_name) else {
        return not_found(group_name);
    };

    match group.get(key) {
        Ok(value) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "application/octet-stream")],
            Bytes::copy_from_slice(value.as_bytes()),
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, "bad request").into_response()
}

fn not_found(group_name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        format!("no such group: {group_name}"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use gocache_common::GoCacheError;
    use tower::ServiceExt;

    fn register_test_group(name: &str) {
        let _ = registry::new_group(
            name,
            0,
            Box::new(|key: &str| {
                if key == "missing" {
                    Err(GoCacheError::NotFound(key.to_string()))
                } else {
                    Ok(key.as_bytes().to_vec())
                }
            }),
        );
    }

    #[tokio::test]
    async fn serves_a_known_key_as_octet_stream() {
        register_test_group("wire-hit");
        let app = router("/_gocache/");

        let response = app
            .oneshot(
                HttpRequest::get("/_gocache/wire-hit/hello")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_group_is_404() {
        let app = router("/_gocache/");

        let response = app
            .oneshot(
                HttpRequest::get("/_gocache/does-not-exist/hello")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_key_segment_is_400() {
        register_test_group("wire-bad-request");
        let app = router("/_gocache/");

        let response = app
            .oneshot(
                HttpRequest::get("/_gocache/wire-bad-request")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn loader_failure_is_500() {
        register_test_group("wire-loader-fails");
        let app = router("/_gocache/");

        let response = app
            .oneshot(
                HttpRequest::get("/_gocache/wire-loader-fails/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn trailing_slash_key_is_not_a_bad_request() {
        register_test_group("wire-trailing-slash");
        let app = router("/_gocache/");

        // Two segments are still produced ("wire-trailing-slash", ""), so
        // this is a KEY_REQUIRED 500 from the group, not a 400 — matching
        // Go's `SplitN` behavior on a trailing slash.
        let response = app
            .oneshot(
                HttpRequest::get("/_gocache/wire-trailing-slash/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn percent_encoded_segments_are_decoded_before_routing() {
        register_test_group("wire/slash-group");
        let app = router("/_gocache/");

        let response = app
            .oneshot(
                HttpRequest::get("/_gocache/wire%2Fslash-group/hello%20world")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
