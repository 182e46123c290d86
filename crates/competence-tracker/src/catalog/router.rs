use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{CompetenceDraft, CompetenceId, SubCompetence, ValidationStatus};
use super::repository::{CompetenceRepository, CompetenceView, RepositoryError};
use super::service::{
    CatalogQuery, CatalogServiceError, CatalogStats, CompetenceService, SortField, SortOrder,
};

/// Router builder exposing the competence CRUD endpoints.
pub fn competence_router<R>(service: Arc<CompetenceService<R>>) -> Router
where
    R: CompetenceRepository + 'static,
{
    Router::new()
        .route(
            "/api/competences",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            "/api/competences/:competence_id",
            get(get_handler::<R>).delete(delete_handler::<R>),
        )
        .route(
            "/api/competences/:competence_id/evaluation",
            put(evaluate_handler::<R>),
        )
        .with_state(service)
}

/// Raw query parameters of the list endpoint. Parsing is lenient: anything
/// unrecognized falls back to the defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    pub(crate) search: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) sort: Option<String>,
    pub(crate) order: Option<String>,
}

impl ListParams {
    fn into_query(self) -> CatalogQuery {
        CatalogQuery {
            search: self.search,
            status: self
                .status
                .as_deref()
                .and_then(ValidationStatus::from_filter),
            sort: self
                .sort
                .as_deref()
                .map(SortField::from_param)
                .unwrap_or_default(),
            order: self
                .order
                .as_deref()
                .map(SortOrder::from_param)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CompetenceListResponse {
    pub(crate) count: usize,
    pub(crate) stats: CatalogStats,
    pub(crate) data: Vec<CompetenceView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EvaluationRequest {
    pub(crate) sub_competences: Vec<SubCompetence>,
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<CompetenceService<R>>>,
    Query(params): Query<ListParams>,
) -> Response
where
    R: CompetenceRepository + 'static,
{
    match service.list(&params.into_query()) {
        Ok(page) => {
            let response = CompetenceListResponse {
                count: page.count,
                stats: page.stats,
                data: page.data.iter().map(|record| record.view()).collect(),
            };
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<CompetenceService<R>>>,
    axum::Json(draft): axum::Json<CompetenceDraft>,
) -> Response
where
    R: CompetenceRepository + 'static,
{
    match service.create(draft) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<CompetenceService<R>>>,
    Path(competence_id): Path<String>,
) -> Response
where
    R: CompetenceRepository + 'static,
{
    let id = match CompetenceId::parse(&competence_id) {
        Ok(id) => id,
        Err(error) => return malformed_id_response(&error.to_string()),
    };

    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn evaluate_handler<R>(
    State(service): State<Arc<CompetenceService<R>>>,
    Path(competence_id): Path<String>,
    axum::Json(request): axum::Json<EvaluationRequest>,
) -> Response
where
    R: CompetenceRepository + 'static,
{
    let id = match CompetenceId::parse(&competence_id) {
        Ok(id) => id,
        Err(error) => return malformed_id_response(&error.to_string()),
    };

    match service.evaluate(&id, request.sub_competences) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<CompetenceService<R>>>,
    Path(competence_id): Path<String>,
) -> Response
where
    R: CompetenceRepository + 'static,
{
    let id = match CompetenceId::parse(&competence_id) {
        Ok(id) => id,
        Err(error) => return malformed_id_response(&error.to_string()),
    };

    match service.remove(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.deleted_view())).into_response(),
        Err(error) => error_response(error),
    }
}

fn malformed_id_response(message: &str) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn error_response(error: CatalogServiceError) -> Response {
    match error {
        CatalogServiceError::Validation(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        CatalogServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "competence not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        CatalogServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "a competence with this code already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        CatalogServiceError::Repository(error) => {
            // Detail stays in the logs; callers only see a generic failure.
            tracing::error!(%error, "catalog repository failure");
            let payload = json!({ "error": "internal server error" });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
