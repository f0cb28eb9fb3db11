use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClass {
    pub name: String,
    pub capacity: i32,
}

/// A class together with its computed occupancy, as listed by `GET /turmas`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub enrolled_count: i64,
    pub remaining_capacity: i64,
}

impl ClassSummary {
    pub fn new(class: Class, enrolled_count: i64) -> Self {
        Self {
            id: class.id,
            name: class.name,
            capacity: class.capacity,
            remaining_capacity: (i64::from(class.capacity) - enrolled_count).max(0),
            enrolled_count,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ClassSummaryRow {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub enrolled_count: i64,
}

impl From<ClassSummaryRow> for ClassSummary {
    fn from(row: ClassSummaryRow) -> Self {
        ClassSummary::new(
            Class { id: row.id, name: row.name, capacity: row.capacity },
            row.enrolled_count,
        )
    }
}
