use serde_json::{json, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::{contains_pattern, FilterWhere};
use super::types::{FilterData, FilterOp, FilterOrderInfo, FilterWhereInfo, SqlResult};
use crate::config::FilterConfig;
use crate::database::models::{Student, StudentStatus};

/// Normalized student filter shared by listing and export
#[derive(Debug, Clone, Default)]
pub struct Filter {
    search: Option<String>,
    class_id: Option<i64>,
    status: Option<StudentStatus>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(search) = data.search { self.search(&search); }
        if let Some(class_id) = data.class_id { self.class_id(class_id); }
        if let Some(status) = data.status.filter(|s| !s.trim().is_empty()) {
            let status: StudentStatus = status.parse().map_err(|_| FilterError::InvalidStatus(status))?;
            self.status(status);
        }
        if let Some(sort) = data.sort { self.order(&sort); }
        if let Some(limit) = data.limit { self.limit(limit)?; }
        if let Some(offset) = data.offset { self.offset(offset)?; }
        Ok(self)
    }

    pub fn search(&mut self, term: &str) -> &mut Self {
        let term = term.trim();
        self.search = if term.is_empty() { None } else { Some(term.to_string()) };
        self
    }

    pub fn class_id(&mut self, class_id: i64) -> &mut Self {
        self.class_id = Some(class_id);
        self
    }

    pub fn status(&mut self, status: StudentStatus) -> &mut Self {
        self.status = Some(status);
        self
    }

    pub fn order(&mut self, fields: &str) -> &mut Self {
        self.order_data = FilterOrder::parse(fields);
        self
    }

    pub fn limit(&mut self, limit: i64) -> Result<&mut Self, FilterError> {
        if limit < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); }
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn offset(&mut self, offset: i64) -> Result<&mut Self, FilterError> {
        if offset < 0 { return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())); }
        self.offset = Some(offset);
        Ok(self)
    }

    /// Applies the listing default limit and caps the limit at the configured max
    pub fn paginate(&mut self, config: &FilterConfig) -> &mut Self {
        let requested = self.limit.or(config.default_limit);
        self.limit = match (requested, config.max_limit) {
            (Some(limit), Some(max)) if limit > max => {
                if config.debug_logging {
                    tracing::debug!("Limit {} exceeds max {}, capping to max", limit, max);
                }
                Some(max)
            }
            (Some(limit), _) => Some(limit),
            (None, max) => max,
        };
        self
    }

    pub fn applied_limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.where_conditions(), 0);
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {}", crate::database::models::student::STUDENT_COLUMNS),
            "FROM \"students\"".to_string(),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        SqlResult { query, params }
    }

    /// In-process equivalent of the WHERE clause
    pub fn matches(&self, student: &Student) -> bool {
        if let Some(term) = &self.search {
            if !student.name.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }
        if self.class_id.is_some() && student.class_id != self.class_id {
            return false;
        }
        if let Some(status) = self.status {
            if student.status != status {
                return false;
            }
        }
        true
    }

    /// Filters, orders and paginates an in-memory set of students
    pub fn apply<I>(&self, students: I) -> Vec<Student>
    where
        I: IntoIterator<Item = Student>,
    {
        let mut matched: Vec<Student> = students.into_iter().filter(|s| self.matches(s)).collect();
        matched.sort_by(|a, b| FilterOrder::compare(&self.order_data, a, b));
        let offset = self.offset.unwrap_or(0).max(0) as usize;
        let limit = self.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        matched.into_iter().skip(offset).take(limit).collect()
    }

    fn where_conditions(&self) -> Vec<FilterWhereInfo> {
        let mut conditions = vec![];
        if let Some(term) = &self.search {
            conditions.push(FilterWhereInfo { column: "name", operator: FilterOp::ILike, data: json!(contains_pattern(term)) });
        }
        if let Some(class_id) = self.class_id {
            conditions.push(FilterWhereInfo { column: "class_id", operator: FilterOp::Eq, data: json!(class_id) });
        }
        if let Some(status) = self.status {
            conditions.push(FilterWhereInfo { column: "status", operator: FilterOp::Eq, data: Value::String(status.as_str().to_string()) });
        }
        conditions
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}
