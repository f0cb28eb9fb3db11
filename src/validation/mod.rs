//! Field validators shared by the student and class payloads.
//!
//! Each validator returns `Result<T, String>` with a user-facing message;
//! payload types run all of them and collect failures into `ValidationErrors`.

pub mod class;
pub mod student;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub use class::ClassPayload;
pub use student::StudentPayload;

pub const MIN_STUDENT_AGE: i32 = 5;

pub const REQUIRED: &str = "campo obrigatório";
pub const TOO_YOUNG: &str = "Aluno deve ter pelo menos 5 anos";
pub const INVALID_EMAIL: &str = "Email inválido ou já existente";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern is valid")
});

/// Every violated field of a payload with its message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Records the error of `result` under `field` and returns its value
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Summary message: the single field message, or a generic one
    pub fn message(&self) -> String {
        match self.fields.len() {
            1 => self.fields.values().next().cloned().unwrap_or_default(),
            _ => "Dados inválidos".to_string(),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.fields.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "validation failed ({})", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Trims `value` and checks its length in characters is within `min..=max`
pub fn validate_name(value: Option<&str>, min: usize, max: usize) -> Result<String, String> {
    let name = value.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(REQUIRED.to_string());
    }
    let len = name.chars().count();
    if len < min || len > max {
        return Err(format!("deve ter entre {} e {} caracteres", min, max));
    }
    Ok(name.to_string())
}

/// Whole years between `birth_date` and `today`
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

pub fn validate_birth_date(value: Option<&str>, today: NaiveDate) -> Result<NaiveDate, String> {
    let raw = value.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| REQUIRED.to_string())?;
    let birth_date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| "data inválida, use o formato AAAA-MM-DD".to_string())?;
    if age_on(birth_date, today) < MIN_STUDENT_AGE {
        return Err(TOO_YOUNG.to_string());
    }
    Ok(birth_date)
}

/// Empty or absent emails normalize to `None`
pub fn validate_email(value: Option<&str>) -> Result<Option<String>, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(email) if EMAIL_RE.is_match(email) => Ok(Some(email.to_string())),
        Some(_) => Err(INVALID_EMAIL.to_string()),
    }
}

pub fn validate_positive(value: Option<i64>, max: i64) -> Result<i64, String> {
    match value {
        None => Err(REQUIRED.to_string()),
        Some(v) if v >= 1 && v <= max => Ok(v),
        Some(_) => Err("deve ser um inteiro positivo".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_accounts_for_month_and_day() {
        let today = date(2024, 6, 15);
        assert_eq!(age_on(date(2019, 6, 15), today), 5);
        assert_eq!(age_on(date(2019, 6, 16), today), 4);
        assert_eq!(age_on(date(2019, 7, 1), today), 4);
        assert_eq!(age_on(date(2019, 5, 31), today), 5);
    }

    #[test]
    fn exactly_five_years_is_old_enough() {
        let today = date(2024, 6, 15);
        assert_eq!(validate_birth_date(Some("2019-06-15"), today), Ok(date(2019, 6, 15)));
        assert_eq!(validate_birth_date(Some("2019-06-16"), today), Err(TOO_YOUNG.to_string()));
    }

    #[test]
    fn future_birth_dates_are_too_young() {
        assert_eq!(validate_birth_date(Some("2030-01-01"), date(2024, 1, 1)), Err(TOO_YOUNG.to_string()));
    }

    #[test]
    fn birth_date_must_parse() {
        assert!(validate_birth_date(Some("15/06/2019"), date(2024, 6, 15)).is_err());
        assert_eq!(validate_birth_date(None, date(2024, 6, 15)), Err(REQUIRED.to_string()));
    }

    #[test]
    fn email_shape() {
        assert_eq!(validate_email(Some("ana.silva@email.com")), Ok(Some("ana.silva@email.com".to_string())));
        assert_eq!(validate_email(Some("  ")), Ok(None));
        assert_eq!(validate_email(None), Ok(None));
        assert_eq!(validate_email(Some("ana@email")), Err(INVALID_EMAIL.to_string()));
        assert_eq!(validate_email(Some("ana silva@email.com")), Err(INVALID_EMAIL.to_string()));
        assert_eq!(validate_email(Some("@email.com")), Err(INVALID_EMAIL.to_string()));
    }

    #[test]
    fn name_is_trimmed_and_bounded() {
        assert_eq!(validate_name(Some("  Ana  "), 3, 100), Ok("Ana".to_string()));
        assert!(validate_name(Some("Al"), 3, 100).is_err());
        assert!(validate_name(Some(&"x".repeat(101)), 3, 100).is_err());
        assert_eq!(validate_name(Some("   "), 3, 100), Err(REQUIRED.to_string()));
        // length counts characters, not bytes
        assert!(validate_name(Some("Júl"), 3, 3).is_ok());
    }

    #[test]
    fn collects_first_message_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "first");
        errors.add("name", "second");
        errors.add("email", INVALID_EMAIL);
        assert_eq!(errors.get("name"), Some("first"));
        assert_eq!(errors.fields().len(), 2);
        assert_eq!(errors.message(), "Dados inválidos");
    }
}
