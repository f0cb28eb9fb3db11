use serde_json::Value;
use sqlx::{self, postgres::PgArguments, FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::filter::types::SqlResult;
use crate::filter::Filter;

/// Runs a rendered `Filter` against the pool, binding its parameters in order
pub struct QueryBuilder<T> {
    sql_result: SqlResult,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    pub fn new(filter: &Filter) -> Self {
        Self {
            sql_result: filter.to_sql(),
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql_result.query
    }

    pub async fn select_all(&self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let mut q = sqlx::query_as::<_, T>(&self.sql_result.query);
        for p in self.sql_result.params.iter() {
            q = bind_param_query_as(q, p)?;
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> Result<sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>, DatabaseError>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            Ok(q.bind(none))
        }
        Value::Bool(b) => Ok(q.bind(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(q.bind(i))
            } else if let Some(f) = n.as_f64() {
                Ok(q.bind(f))
            } else {
                Err(DatabaseError::QueryError(format!("unsupported numeric parameter {}", n)))
            }
        }
        Value::String(s) => Ok(q.bind(s.as_str())),
        Value::Array(_) | Value::Object(_) => {
            Err(DatabaseError::QueryError(format!("unsupported filter parameter {}", v)))
        }
    }
}
