// HTTP routes: agent uploads and read-only record queries

mod http;
mod usage;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::usage_repo::{StoreError, UsageRepo};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) usage_repo: Arc<UsageRepo>,
}

pub fn app(usage_repo: Arc<UsageRepo>, config: AppConfig) -> Router {
    let state = AppState { usage_repo };
    Router::new()
        .route("/", get(|| async { "usagesite: upload endpoint is POST /api/usage/upload" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/usage/upload", post(usage::upload_handler)) // POST /api/usage/upload
        .route("/api/usage", get(usage::list_records_handler)) // GET /api/usage?cpu=
        .route(
            "/api/usage/{id}",
            get(usage::get_record_handler).delete(usage::delete_record_handler),
        ) // GET, DELETE /api/usage/{id}
        .route("/api/cameras", get(usage::list_cameras_handler)) // GET /api/cameras
        .route("/api/cameras/{id}", get(usage::get_camera_handler)) // GET /api/cameras/{id}
        .route("/api/gpus", get(usage::list_gpus_handler)) // GET /api/gpus
        .route("/api/gpus/{id}", get(usage::get_gpu_handler)) // GET /api/gpus/{id}
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// Handler error rendered as `{"success": false, "error": ...}`.
pub(crate) enum ApiError {
    NotFound(&'static str),
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            Self::Store(e) => {
                tracing::warn!(error = %e, "store error while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, "store error".to_string())
            }
        };
        let body = Json(serde_json::json!({ "success": false, "error": message }));
        (status, body).into_response()
    }
}
