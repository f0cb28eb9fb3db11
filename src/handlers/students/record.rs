use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
};
use axum::Json;

use crate::api::{ApiResponse, ApiResult};
use crate::database::models::Student;
use crate::handlers::utils::path_id;
use crate::services::AppState;
use crate::validation::StudentPayload;

/// GET /alunos/:id
pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Student> {
    let id = path_id(id)?;
    Ok(ApiResponse::success(state.students.get(id).await?))
}

/// PUT /alunos/:id - Replace every field of a student
pub async fn put(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> ApiResult<Student> {
    let id = path_id(id)?;
    let Json(payload) = payload?;
    let student = state.students.update(id, &payload).await?;
    Ok(ApiResponse::success(student))
}

/// DELETE /alunos/:id
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = path_id(id)?;
    state.students.delete(id).await?;
    Ok(ApiResponse::no_content())
}
