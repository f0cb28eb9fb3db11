use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::error::{ServiceError, ServiceResult};
use crate::database::models::Student;
use crate::database::store::Store;
use crate::filter::{Filter, FilterData, FilterError};

pub const CSV_HEADER: [&str; 6] = ["id", "name", "birth_date", "email", "status", "class_id"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "alunos.csv",
            ExportFormat::Json => "alunos.json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(FilterError::InvalidFormat(s.to_string())),
        }
    }
}

/// A rendered export, ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub format: ExportFormat,
    pub body: Vec<u8>,
}

impl ExportDocument {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.format.file_name())
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: i64,
    name: &'a str,
    birth_date: String,
    email: &'a str,
    status: &'a str,
    class_id: Option<i64>,
}

impl<'a> From<&'a Student> for CsvRow<'a> {
    fn from(s: &'a Student) -> Self {
        Self {
            id: s.id,
            name: &s.name,
            birth_date: s.birth_date.format("%Y-%m-%d").to_string(),
            email: s.email.as_deref().unwrap_or(""),
            status: s.status.as_str(),
            class_id: s.class_id,
        }
    }
}

#[derive(Clone)]
pub struct ExportService {
    store: Arc<dyn Store>,
}

impl ExportService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Exports the whole filtered set. Only an explicit limit/offset narrows it.
    pub async fn export(&self, data: FilterData, format: ExportFormat) -> ServiceResult<ExportDocument> {
        let mut filter = Filter::new();
        filter.assign(data)?;
        let students = self.store.list_students(&filter).await?;

        let body = match format {
            ExportFormat::Csv => render_csv(&students)?,
            ExportFormat::Json => serde_json::to_vec(&students).map_err(|e| ServiceError::Export(e.to_string()))?,
        };
        info!("Exported {} students as {:?}", students.len(), format);
        Ok(ExportDocument { format, body })
    }
}

pub fn render_csv(students: &[Student]) -> ServiceResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(export_error)?;
    for student in students {
        writer.serialize(CsvRow::from(student)).map_err(export_error)?;
    }
    writer.into_inner().map_err(|e| ServiceError::Export(e.to_string()))
}

fn export_error(err: csv::Error) -> ServiceError {
    ServiceError::Export(err.to_string())
}
