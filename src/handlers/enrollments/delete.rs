use axum::extract::{rejection::PathRejection, Path, State};

use crate::api::{ApiResponse, ApiResult};
use crate::database::models::Student;
use crate::handlers::utils::path_id;
use crate::services::AppState;

/// DELETE /matriculas/:student_id - Remove a student from their class
pub async fn delete(
    State(state): State<AppState>,
    student_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Student> {
    let student_id = path_id(student_id)?;
    Ok(ApiResponse::success(state.enrollments.unenroll(student_id).await?))
}
