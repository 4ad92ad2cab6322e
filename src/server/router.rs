use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sweeper_scheduler::{ControlRequest, SchedulerError};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, warn};

use super::state::ServeState;

pub fn build_router() -> Router<ServeState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/control", post(control_handler))
        .route("/metrics", get(metrics_handler))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn health_handler(State(state): State<ServeState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "observer_running": state.observer.is_running(),
        "phase": state.observer.phase(),
        "uptime_secs": state.uptime_secs(),
    }))
}

async fn status_handler(State(state): State<ServeState>) -> Response {
    match state.observer.status().await {
        Ok(status) => Json(status).into_response(),
        Err(err) => unavailable(err),
    }
}

async fn control_handler(
    State(state): State<ServeState>,
    Json(request): Json<ControlRequest>,
) -> Response {
    debug!(?request, "control request");
    match state.observer.control(request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => unavailable(err),
    }
}

async fn metrics_handler() -> Json<serde_json::Value> {
    Json(json!({
        "perceiver": perceiver_pattern::metrics::snapshot(),
        "scheduler": sweeper_scheduler::metrics::snapshot(),
    }))
}

fn unavailable(err: SchedulerError) -> Response {
    warn!(error = %err, "observer unavailable");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use document_adapter::{DocumentFixture, InMemoryDocument, NodeId};
    use serde_json::Value;
    use sweeper_event_bus::InMemoryBus;
    use sweeper_scheduler::{Observer, ObserverEvent, ObserverOptions};
    use sweeper_state_center::InMemorySettingsStore;
    use tower::ServiceExt;

    use super::*;

    fn spawn_observer() -> sweeper_scheduler::ObserverHandle<NodeId> {
        let doc = InMemoryDocument::from_fixture(
            &DocumentFixture::element("body").with_child(DocumentFixture::element("div").with_id("main")),
        );
        let bus: Arc<InMemoryBus<ObserverEvent<NodeId>>> = InMemoryBus::new(16);
        Observer::spawn(doc, InMemorySettingsStore::new(), bus, ObserverOptions::default())
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_running_observer() {
        let observer = spawn_observer();
        let app = build_router().with_state(ServeState::new(observer.clone()));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["observer_running"], true);
        assert_eq!(body["phase"], "idle");
        observer.shutdown().await;
    }

    #[tokio::test]
    async fn control_toggles_and_status_reflects_them() {
        let observer = spawn_observer();
        let app = build_router().with_state(ServeState::new(observer.clone()));

        let response = app
            .clone()
            .oneshot(
                Request::post("/control")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"type":"set_disable","value":true}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["globallyDisabled"], true);

        let response = app
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["globally_disabled"], true);
        assert_eq!(body["diagnostics_enabled"], false);
        observer.shutdown().await;
    }

    #[tokio::test]
    async fn stopped_observer_yields_service_unavailable() {
        let observer = spawn_observer();
        observer.shutdown().await;
        let app = build_router().with_state(ServeState::new(observer));
        let response = app
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn metrics_include_both_layers() {
        let observer = spawn_observer();
        let app = build_router().with_state(ServeState::new(observer.clone()));
        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert!(body.get("perceiver").is_some());
        assert!(body.get("scheduler").is_some());
        observer.shutdown().await;
    }
}
