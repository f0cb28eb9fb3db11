use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::database::manager::DatabaseError;

/// Enrollment status of a student. Stored and rendered in English; the
/// Portuguese spellings are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
    #[default]
    Inactive,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl FromStr for StudentStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "ativo" => Ok(StudentStatus::Active),
            "inactive" | "inativo" => Ok(StudentStatus::Inactive),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub birth_date: NaiveDate,
    pub email: Option<String>,
    pub status: StudentStatus,
    pub class_id: Option<i64>,
}

/// A validated student ready to be inserted or to replace an existing row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub birth_date: NaiveDate,
    pub email: Option<String>,
    pub status: StudentStatus,
    pub class_id: Option<i64>,
}

impl NewStudent {
    pub fn into_student(self, id: i64) -> Student {
        Student {
            id,
            name: self.name,
            birth_date: self.birth_date,
            email: self.email,
            status: self.status,
            class_id: self.class_id,
        }
    }
}

/// Raw `students` row; status is kept as text in the table
#[derive(Debug, Clone, FromRow)]
pub struct StudentRow {
    pub id: i64,
    pub name: String,
    pub birth_date: NaiveDate,
    pub email: Option<String>,
    pub status: String,
    pub class_id: Option<i64>,
}

impl TryFrom<StudentRow> for Student {
    type Error = DatabaseError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|InvalidStatus(s)| DatabaseError::QueryError(format!("unexpected status '{}' for student {}", s, row.id)))?;
        Ok(Student {
            id: row.id,
            name: row.name,
            birth_date: row.birth_date,
            email: row.email,
            status,
            class_id: row.class_id,
        })
    }
}

pub const STUDENT_COLUMNS: &str = "\"id\", \"name\", \"birth_date\", \"email\", \"status\", \"class_id\"";
