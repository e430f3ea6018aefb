// Upload, query and delete handlers for usage records.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::models::{Camera, GpuInfo, UsageRecord, UsageUpload};
use crate::usage_repo::UpsertOutcome;

/// POST /api/usage/upload — store an agent snapshot. The caller is already authenticated.
pub(super) async fn upload_handler(
    State(state): State<AppState>,
    Json(upload): Json<UsageUpload>,
) -> impl IntoResponse {
    match state.usage_repo.upsert_usage_snapshot(&upload).await {
        Ok(UpsertOutcome::Rejected) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "success": false, "error": "record rejected" })),
        ),
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "id": outcome.record_id() })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "dropping usage upload");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "success": false, "error": "upload failed" })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ListParams {
    /// SQL LIKE pattern matched against the CPU model.
    cpu: Option<String>,
}

/// GET /api/usage — most recent first, or filtered by `?cpu=`.
pub(super) async fn list_records_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<UsageRecord>>, ApiError> {
    let records = match params.cpu {
        Some(pattern) => state.usage_repo.find_usage_records_by_cpu(&pattern).await?,
        None => state.usage_repo.list_usage_records_by_recency().await?,
    };
    Ok(Json(records))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecordDetail {
    record: UsageRecord,
    cameras: Vec<Camera>,
    gpus: Vec<GpuInfo>,
}

/// GET /api/usage/{id} — one record with its cameras and GPUs.
pub(super) async fn get_record_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecordDetail>, ApiError> {
    let repo = &state.usage_repo;
    let record = repo
        .get_usage_record(id)
        .await?
        .ok_or(ApiError::NotFound("usage record"))?;
    let cameras = repo.list_cameras_for_record(id).await?;
    let gpus = repo.list_gpus_for_record(id).await?;
    Ok(Json(RecordDetail {
        record,
        cameras,
        gpus,
    }))
}

/// DELETE /api/usage/{id}
pub(super) async fn delete_record_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let success = state.usage_repo.delete_usage_record(id).await;
    Json(serde_json::json!({ "success": success }))
}

pub(super) async fn list_cameras_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Camera>>, ApiError> {
    Ok(Json(state.usage_repo.list_cameras().await?))
}

pub(super) async fn get_camera_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Camera>, ApiError> {
    state
        .usage_repo
        .get_camera(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("camera"))
}

pub(super) async fn list_gpus_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<GpuInfo>>, ApiError> {
    Ok(Json(state.usage_repo.list_gpus().await?))
}

pub(super) async fn get_gpu_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<GpuInfo>, ApiError> {
    state
        .usage_repo
        .get_gpu(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("gpu"))
}
