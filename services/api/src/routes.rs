use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Utc;
use competence_tracker::catalog::{competence_router, CompetenceRepository, CompetenceService};
use serde_json::json;

use crate::infra::AppState;

/// Compose the catalog routes with the operational endpoints.
pub(crate) fn with_catalog_routes<R>(service: Arc<CompetenceService<R>>) -> axum::Router
where
    R: CompetenceRepository + 'static,
{
    competence_router(service)
        .route("/api/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "competence tracker API is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use competence_tracker::catalog::CompetenceService;
    use tower::ServiceExt;

    use crate::infra::{seed_catalog, InMemoryCompetenceRepository};

    #[tokio::test]
    async fn healthcheck_reports_a_liveness_payload() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn seeded_catalog_is_served_over_http() {
        let repository = Arc::new(InMemoryCompetenceRepository::default());
        let service = Arc::new(CompetenceService::new(repository));
        seed_catalog(&service).expect("seed succeeds");
        let router = with_catalog_routes(service);

        let response = router
            .oneshot(
                Request::get("/api/competences?sort=code&order=asc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json payload");
        assert_eq!(body["count"], 4);
        assert_eq!(body["data"][0]["code"], "C1");
    }
}
