use axum::extract::{rejection::QueryRejection, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::ApiError;
use crate::filter::FilterData;
use crate::services::{AppState, ExportFormat};

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub search: Option<String>,
    #[serde(alias = "turma_id")]
    pub class_id: Option<i64>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// `csv` (default) or `json`
    pub format: Option<String>,
}

impl ExportQuery {
    fn split(self) -> (FilterData, Option<String>) {
        let data = FilterData {
            search: self.search,
            class_id: self.class_id,
            status: self.status,
            sort: self.sort,
            limit: self.limit,
            offset: self.offset,
        };
        (data, self.format)
    }
}

/// GET /alunos/export - Complete filtered student set as a CSV or JSON attachment
pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let (data, format) = query.split();
    let format: ExportFormat = match format {
        Some(raw) => raw.parse()?,
        None => ExportFormat::default(),
    };

    let document = state.exports.export(data, format).await?;
    let headers = [
        (header::CONTENT_TYPE, document.content_type().to_string()),
        (header::CONTENT_DISPOSITION, document.content_disposition()),
    ];
    Ok((headers, document.body).into_response())
}
