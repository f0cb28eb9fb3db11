use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
};
use axum::Json;

use crate::api::{ApiResponse, ApiResult};
use crate::database::models::ClassSummary;
use crate::handlers::utils::path_id;
use crate::services::AppState;
use crate::validation::ClassPayload;

/// GET /turmas/:id
pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ClassSummary> {
    let id = path_id(id)?;
    Ok(ApiResponse::success(state.classes.get(id).await?))
}

/// PUT /turmas/:id - Rename or resize a class
pub async fn put(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ClassPayload>, JsonRejection>,
) -> ApiResult<ClassSummary> {
    let id = path_id(id)?;
    let Json(payload) = payload?;
    Ok(ApiResponse::success(state.classes.update(id, &payload).await?))
}

/// DELETE /turmas/:id - Students of the class are unenrolled, not deleted
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = path_id(id)?;
    state.classes.delete(id).await?;
    Ok(ApiResponse::no_content())
}
