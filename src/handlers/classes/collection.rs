use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::api::{ApiResponse, ApiResult};
use crate::database::models::ClassSummary;
use crate::services::AppState;
use crate::validation::ClassPayload;

/// GET /turmas - Every class with its occupancy
pub async fn get(State(state): State<AppState>) -> ApiResult<Vec<ClassSummary>> {
    Ok(ApiResponse::success(state.classes.list().await?))
}

/// POST /turmas
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<ClassPayload>, JsonRejection>,
) -> ApiResult<ClassSummary> {
    let Json(payload) = payload?;
    let class = state.classes.create(&payload).await?;
    Ok(ApiResponse::created(class))
}
