use serde::{Deserialize, Serialize};

/// Raw listing parameters as they arrive on the query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterData {
    /// Case-insensitive substring of the student name
    pub search: Option<String>,
    #[serde(alias = "turma_id")]
    pub class_id: Option<i64>,
    pub status: Option<String>,
    /// e.g. `name`, `-birth_date`, `name,-birth_date`
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    ILike,
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: &'static str,
    pub operator: FilterOp,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    BirthDate,
    Id,
}

impl SortField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "name" | "nome" => Some(SortField::Name),
            "birth_date" | "data_nascimento" => Some(SortField::BirthDate),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::BirthDate => "birth_date",
            SortField::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub field: SortField,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}
