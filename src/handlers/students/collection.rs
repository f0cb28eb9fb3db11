use axum::extract::{
    rejection::{JsonRejection, QueryRejection},
    Query, State,
};
use axum::Json;

use crate::api::{ApiResponse, ApiResult};
use crate::database::models::Student;
use crate::filter::FilterData;
use crate::services::AppState;
use crate::validation::StudentPayload;

/// GET /alunos - Filtered, sorted and paginated students
pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<FilterData>, QueryRejection>,
) -> ApiResult<Vec<Student>> {
    let Query(data) = query?;
    let students = state.students.list(data).await?;
    Ok(ApiResponse::success(students))
}

/// POST /alunos - Create a student
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> ApiResult<Student> {
    let Json(payload) = payload?;
    let student = state.students.create(&payload).await?;
    Ok(ApiResponse::created(student))
}
