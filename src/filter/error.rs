use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid status filter: {0}")]
    InvalidStatus(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),

    #[error("Invalid export format: {0}")]
    InvalidFormat(String),
}

impl FilterError {
    /// Query parameter the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            FilterError::InvalidStatus(_) => "status",
            FilterError::InvalidLimit(_) => "limit",
            FilterError::InvalidOffset(_) => "offset",
            FilterError::InvalidFormat(_) => "format",
        }
    }
}
