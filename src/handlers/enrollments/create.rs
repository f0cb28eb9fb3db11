use axum::body::Bytes;
use axum::extract::{rejection::QueryRejection, Query, State};

use crate::api::{ApiResponse, ApiResult};
use crate::database::models::Enrollment;
use crate::error::ApiError;
use crate::services::{AppState, EnrollmentRequest};

/// POST /matriculas - Enroll a student in a class.
///
/// Ids come from a JSON body `{student_id, class_id}` or the query string;
/// body fields win when both are given.
pub async fn post(
    State(state): State<AppState>,
    query: Result<Query<EnrollmentRequest>, QueryRejection>,
    body: Bytes,
) -> ApiResult<Enrollment> {
    let Query(from_query) = query?;
    let from_body = parse_body(&body)?;

    let request = from_body.or(from_query);
    let enrollment = state.enrollments.enroll(&request).await?;
    Ok(ApiResponse::created(enrollment))
}

fn parse_body(body: &[u8]) -> Result<EnrollmentRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(EnrollmentRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::unprocessable_entity(format!("Corpo da requisição inválido: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_defers_to_query() {
        let request = parse_body(b"  ").unwrap();
        assert_eq!((request.student_id, request.class_id), (None, None));
    }

    #[test]
    fn body_accepts_portuguese_names() {
        let request = parse_body(br#"{"aluno_id": 4, "turma_id": 2}"#).unwrap();
        assert_eq!((request.student_id, request.class_id), (Some(4), Some(2)));
    }

    #[test]
    fn malformed_body_is_unprocessable() {
        let err = parse_body(b"student_id=4").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }
}
