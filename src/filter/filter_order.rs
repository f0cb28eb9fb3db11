use std::cmp::Ordering;

use super::types::{FilterOrderInfo, SortDirection, SortField};
use crate::database::models::Student;

pub struct FilterOrder;

impl FilterOrder {
    /// Parses `name`, `-birth_date` or a comma separated list of them.
    /// Unknown fields are skipped.
    pub fn parse(fields: &str) -> Vec<FilterOrderInfo> {
        let mut out: Vec<FilterOrderInfo> = Vec::new();
        for part in fields.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (name, sort) = match trimmed.strip_prefix('-') {
                Some(rest) => (rest.trim(), SortDirection::Desc),
                None => (trimmed.trim_start_matches('+'), SortDirection::Asc),
            };
            match SortField::parse(name) {
                Some(field) if !out.iter().any(|o| o.field == field) => {
                    out.push(FilterOrderInfo { field, sort });
                }
                Some(_) => {}
                None => tracing::debug!("Ignoring unknown sort field '{}'", name),
            }
        }
        out
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        let parts: Vec<String> = infos
            .iter()
            .chain(std::iter::once(&TIE_BREAKER))
            .map(|i| format!("{} {}", Self::sort_expression(i.field), i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }

    /// Names sort case-insensitively, as `compare` does
    fn sort_expression(field: SortField) -> String {
        match field {
            SortField::Name => format!("LOWER(\"{}\")", field.column()),
            _ => format!("\"{}\"", field.column()),
        }
    }

    pub fn compare(infos: &[FilterOrderInfo], a: &Student, b: &Student) -> Ordering {
        for info in infos.iter().chain(std::iter::once(&TIE_BREAKER)) {
            let ord = match info.field {
                SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                SortField::BirthDate => a.birth_date.cmp(&b.birth_date),
                SortField::Id => a.id.cmp(&b.id),
            };
            let ord = match info.sort {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

const TIE_BREAKER: FilterOrderInfo = FilterOrderInfo { field: SortField::Id, sort: SortDirection::Asc };

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_descending_prefix() {
        let order = FilterOrder::parse("-birth_date");
        assert_eq!(order, vec![FilterOrderInfo { field: SortField::BirthDate, sort: SortDirection::Desc }]);
    }

    #[test]
    fn ignores_unknown_and_duplicate_fields() {
        let order = FilterOrder::parse("email, name, -name ,status");
        assert_eq!(order, vec![FilterOrderInfo { field: SortField::Name, sort: SortDirection::Asc }]);
    }

    #[test]
    fn id_is_always_the_last_key() {
        let order = FilterOrder::parse("-name");
        assert_eq!(FilterOrder::generate(&order), "ORDER BY LOWER(\"name\") DESC, \"id\" ASC");
        assert_eq!(FilterOrder::generate(&[]), "ORDER BY \"id\" ASC");
    }
}
