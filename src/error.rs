// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::database::store::StoreError;
use crate::filter::FilterError;
use crate::services::ServiceError;
use crate::validation::{ValidationErrors, INVALID_EMAIL};

pub const STORE_ERROR_MESSAGE: &str = "Erro interno ao acessar o banco de dados";

pub type FieldErrors = BTreeMap<String, String>;

/// HTTP API error with its status code and client-facing message
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError {
        message: String,
        fields: Option<FieldErrors>,
    },

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict {
        message: String,
        fields: Option<FieldErrors>,
    },

    // 422 Unprocessable Entity (body is not JSON or not the expected shape)
    UnprocessableEntity(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Error kind reported in the `error` field of the body
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } | ApiError::UnprocessableEntity(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::InternalServerError(_) | ApiError::ServiceUnavailable(_) => "store_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } => message,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict { message, .. } => message,
            ApiError::UnprocessableEntity(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::ValidationError { fields, .. } | ApiError::Conflict { fields, .. } => fields.as_ref(),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": self.kind(),
            "message": self.message(),
        });
        if let Some(fields) = self.fields() {
            body["fields"] = json!(fields);
        }
        body
    }
}

impl ApiError {
    pub fn validation_error(message: impl Into<String>, fields: Option<FieldErrors>) -> Self {
        ApiError::ValidationError { message: message.into(), fields }
    }

    pub fn field_error(field: &str, message: impl Into<String>) -> Self {
        ValidationErrors::single(field, message).into()
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict { message: message.into(), fields: None }
    }

    fn field_conflict(field: &str, message: &str) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), message.to_string());
        ApiError::Conflict { message: message.to_string(), fields: Some(fields) }
    }

    pub fn unprocessable_entity(message: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::validation_error(errors.message(), Some(errors.fields().clone()))
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        let message = match &err {
            FilterError::InvalidStatus(_) => "deve ser 'ativo' ou 'inativo'".to_string(),
            FilterError::InvalidLimit(msg) | FilterError::InvalidOffset(msg) => msg.clone(),
            FilterError::InvalidFormat(_) => "deve ser 'csv' ou 'json'".to_string(),
        };
        ApiError::field_error(err.field(), message)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::StudentNotFound(id) => ApiError::not_found(format!("Aluno {} não encontrado", id)),
            StoreError::ClassNotFound(id) => ApiError::not_found(format!("Turma {} não encontrada", id)),
            StoreError::DuplicateEmail => ApiError::field_conflict("email", INVALID_EMAIL),
            StoreError::DuplicateClassName => ApiError::field_conflict("name", "Já existe uma turma com este nome"),
            StoreError::CapacityExceeded { class_id, capacity } => ApiError::conflict(format!(
                "Turma {} atingiu a capacidade máxima ({} alunos)",
                class_id, capacity
            )),
            StoreError::AlreadyEnrolled { student_id, class_id } => ApiError::conflict(format!(
                "Aluno {} já está matriculado na turma {}",
                student_id, class_id
            )),
            StoreError::NotEnrolled(id) => {
                ApiError::conflict(format!("Aluno {} não está matriculado em nenhuma turma", id))
            }
            StoreError::CapacityBelowOccupancy { enrolled, .. } => ApiError::field_conflict(
                "capacity",
                &format!("Capacidade menor que o número de alunos matriculados ({})", enrolled),
            ),
            StoreError::Database(db_err) => {
                // Log the real error but return a generic message
                tracing::error!("Store error: {}", db_err);
                ApiError::internal_server_error(STORE_ERROR_MESSAGE)
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => errors.into(),
            ServiceError::InvalidQuery(err) => err.into(),
            ServiceError::Store(err) => err.into(),
            ServiceError::Export(msg) => {
                tracing::error!("Export error: {}", msg);
                ApiError::internal_server_error("Falha ao gerar a exportação")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::unprocessable_entity(format!("Corpo da requisição inválido: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation_error(format!("Parâmetros de consulta inválidos: {}", rejection.body_text()), None)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation_error(format!("Identificador inválido: {}", rejection.body_text()), None)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
