//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS)
//! - Bind server to listener
//! - Stop gracefully on the shutdown signal

use axum::{body::Body, http::Request, routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::http::track::{health, track_shipment, unknown_route};
use crate::tracking::TrackingService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub tracking: Arc<TrackingService>,
}

/// HTTP front of the tracking service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(tracking: Arc<TrackingService>) -> Self {
        let router = build_router(AppState { tracking });
        Self { router }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/track", get(track_shipment))
        .route("/health", get(health))
        .fallback(unknown_route)
        .with_state(state)
        .layer(middleware)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::{TrackingError, TrackingResult, TrackingSource};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    struct ScriptedSource;

    #[async_trait]
    impl TrackingSource for ScriptedSource {
        async fn fetch(&self, reference: &str) -> TrackingResult<Value> {
            match reference {
                "0000000000" => Err(TrackingError::NotFound("Tracking reference not found".into())),
                "1111111111" => Err(TrackingError::SchemaMismatch),
                _ => Ok(json!({ "sttNumber": "X", "events": [{ "code": "ENT", "date": "2024-01-01" }] })),
            }
        }
    }

    fn app() -> Router {
        let tracking = Arc::new(TrackingService::new(Arc::new(ScriptedSource), Duration::from_secs(60)));
        build_router(AppState { tracking })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_ref() {
        let (status, body) = get_json(app(), "/track").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing ref" }));

        let (status, _) = get_json(app(), "/track?ref=%20%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_undecodable_query_is_json_error() {
        let response = app()
            .oneshot(Request::builder().uri("/track?ref=1&ref=2").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("application/json"));

        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Missing ref" }));
    }

    #[tokio::test]
    async fn test_live_lookup() {
        let (status, body) = get_json(app(), "/track?ref=1234567890").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "live");
        assert_eq!(body["data"]["sttNumber"], "X");
        assert_eq!(
            body["data"]["trackingHistory"][0]["location"],
            json!({ "name": null, "code": null, "countryCode": null })
        );
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, body) = get_json(app(), "/track?ref=0000000000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
        assert_eq!(body["message"], "Tracking reference not found");
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let (status, body) = get_json(app(), "/track?ref=1111111111").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Tracking failed");
        assert!(body["message"].as_str().unwrap().contains("schema"));
    }

    #[tokio::test]
    async fn test_health_and_fallback() {
        let (status, body) = get_json(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cacheEntries"], 0);

        let (status, body) = get_json(app(), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "No route for /nope");
    }
}
