use serde::Deserialize;

use super::{validate_name, validate_positive, ValidationErrors};
use crate::database::models::NewClass;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;

/// Class body of `POST /turmas` and `PUT /turmas/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassPayload {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    #[serde(alias = "capacidade")]
    pub capacity: Option<i64>,
}

impl ClassPayload {
    pub fn validate(&self) -> Result<NewClass, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.check("name", validate_name(self.name.as_deref(), NAME_MIN, NAME_MAX));
        let capacity = errors.check("capacity", validate_positive(self.capacity, i64::from(i32::MAX)));

        match (name, capacity) {
            (Some(name), Some(capacity)) => Ok(NewClass { name, capacity: capacity as i32 }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_portuguese_aliases() {
        let p: ClassPayload = serde_json::from_value(serde_json::json!({ "nome": "6º Ano A", "capacidade": 25 })).unwrap();
        assert_eq!(p.validate().unwrap(), NewClass { name: "6º Ano A".to_string(), capacity: 25 });
    }

    #[test]
    fn capacity_must_be_positive() {
        for capacity in [Some(0), Some(-3), None, Some(i64::from(i32::MAX) + 1)] {
            let p = ClassPayload { name: Some("Turma A".to_string()), capacity };
            let errors = p.validate().unwrap_err();
            assert!(errors.get("capacity").is_some(), "capacity {:?} accepted", capacity);
        }
    }

    #[test]
    fn name_needs_two_characters() {
        let p = ClassPayload { name: Some(" A ".to_string()), capacity: Some(10) };
        assert!(p.validate().unwrap_err().get("name").is_some());
    }
}
