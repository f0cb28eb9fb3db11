use chrono::NaiveDate;
use serde::Deserialize;

use super::{validate_birth_date, validate_email, validate_name, validate_positive, ValidationErrors};
use crate::database::models::{NewStudent, StudentStatus};

pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 100;

/// Student body of `POST /alunos` and `PUT /alunos/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPayload {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    #[serde(alias = "data_nascimento")]
    pub birth_date: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "turma_id")]
    pub class_id: Option<i64>,
}

impl StudentPayload {
    /// Checks every field against the rules as of `today`
    pub fn validate(&self, today: NaiveDate) -> Result<NewStudent, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors.check("name", validate_name(self.name.as_deref(), NAME_MIN, NAME_MAX));
        let birth_date = errors.check("birth_date", validate_birth_date(self.birth_date.as_deref(), today));
        let email = errors.check("email", validate_email(self.email.as_deref()));
        let status = errors.check("status", parse_status(self.status.as_deref()));
        let class_id = match self.class_id {
            Some(id) => errors.check("class_id", validate_positive(Some(id), i64::MAX)).map(Some),
            None => Some(None),
        };

        match (name, birth_date, email, status, class_id) {
            (Some(name), Some(birth_date), Some(email), Some(status), Some(class_id)) if errors.is_empty() => {
                Ok(NewStudent { name, birth_date, email, status, class_id })
            }
            _ => Err(errors),
        }
    }
}

fn parse_status(value: Option<&str>) -> Result<StudentStatus, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(StudentStatus::default()),
        Some(raw) => raw
            .parse()
            .map_err(|_| "deve ser 'ativo' ou 'inativo'".to_string()),
    }
}
