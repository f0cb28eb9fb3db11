use axum::extract::{rejection::PathRejection, Path};

use crate::error::ApiError;

/// Resolves a numeric path id, rejecting anything that is not a positive integer
pub fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    let Path(id) = path?;
    if id < 1 {
        return Err(ApiError::field_error("id", "deve ser um inteiro positivo"));
    }
    Ok(id)
}
