use thiserror::Error;

use crate::database::store::StoreError;
use crate::filter::FilterError;
use crate::validation::ValidationErrors;

/// Errors returned by the service layer to the HTTP handlers and the CLI
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    InvalidQuery(#[from] FilterError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Export failed: {0}")]
    Export(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
