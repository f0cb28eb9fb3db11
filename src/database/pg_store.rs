use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::database::manager::DatabaseManager;
use crate::database::models::class::ClassSummaryRow;
use crate::database::models::enrollment::{apply_enrollment, check_enrollment, check_seat};
use crate::database::models::student::{StudentRow, STUDENT_COLUMNS};
use crate::database::models::{
    Class, ClassSummary, Enrollment, NewClass, NewStudent, Occupancy, Student, StudentStatus,
};
use crate::database::query_builder::QueryBuilder;
use crate::database::store::{Store, StoreError};
use crate::filter::Filter;

const CLASS_SUMMARY_SQL: &str = "SELECT c.\"id\", c.\"name\", c.\"capacity\", COUNT(s.\"id\") AS enrolled_count \
     FROM \"classes\" c LEFT JOIN \"students\" s ON s.\"class_id\" = c.\"id\"";

/// `Store` backed by PostgreSQL. Capacity checks lock the class row with
/// `SELECT ... FOR UPDATE` inside the same transaction as the write.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock_class(tx: &mut Transaction<'_, Postgres>, class_id: i64) -> Result<Class, StoreError> {
        sqlx::query_as::<_, Class>(
            "SELECT \"id\", \"name\", \"capacity\" FROM \"classes\" WHERE \"id\" = $1 FOR UPDATE",
        )
        .bind(class_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StoreError::ClassNotFound(class_id))
    }

    async fn lock_student(tx: &mut Transaction<'_, Postgres>, student_id: i64) -> Result<Student, StoreError> {
        let sql = format!("SELECT {} FROM \"students\" WHERE \"id\" = $1 FOR UPDATE", STUDENT_COLUMNS);
        let row = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(student_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(StoreError::StudentNotFound(student_id))?;
        Ok(Student::try_from(row)?)
    }

    async fn count_enrolled(tx: &mut Transaction<'_, Postgres>, class_id: i64) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM \"students\" WHERE \"class_id\" = $1")
            .bind(class_id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(count)
    }

    /// Locks the target class and checks a seat is free for a new student
    async fn reserve_seat(tx: &mut Transaction<'_, Postgres>, class_id: Option<i64>) -> Result<(), StoreError> {
        if let Some(class_id) = class_id {
            let class = Self::lock_class(tx, class_id).await?;
            let enrolled = Self::count_enrolled(tx, class_id).await?;
            check_seat(&class, enrolled, None)?;
        }
        Ok(())
    }

    async fn write_student(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        student: &Student,
    ) -> Result<Student, StoreError> {
        let sql = format!(
            "UPDATE \"students\" SET \"name\" = $2, \"birth_date\" = $3, \"email\" = $4, \"status\" = $5, \"class_id\" = $6 \
             WHERE \"id\" = $1 RETURNING {}",
            STUDENT_COLUMNS
        );
        let row = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(id)
            .bind(&student.name)
            .bind(student.birth_date)
            .bind(&student.email)
            .bind(student.status.as_str())
            .bind(student.class_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(StoreError::StudentNotFound(id))?;
        Ok(Student::try_from(row)?)
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await?;
        Ok(())
    }

    async fn list_students(&self, filter: &Filter) -> Result<Vec<Student>, StoreError> {
        let rows = QueryBuilder::<StudentRow>::new(filter).select_all(&self.pool).await?;
        let students = rows.into_iter().map(Student::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    async fn get_student(&self, id: i64) -> Result<Option<Student>, StoreError> {
        let sql = format!("SELECT {} FROM \"students\" WHERE \"id\" = $1", STUDENT_COLUMNS);
        let row = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Student::try_from).transpose()?)
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, StoreError> {
        let sql = format!("SELECT {} FROM \"students\" WHERE \"email\" = $1", STUDENT_COLUMNS);
        let row = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Student::try_from).transpose()?)
    }

    async fn insert_student(&self, student: &NewStudent) -> Result<Student, StoreError> {
        let mut tx = self.pool.begin().await?;
        Self::reserve_seat(&mut tx, student.class_id).await?;

        let sql = format!(
            "INSERT INTO \"students\" (\"name\", \"birth_date\", \"email\", \"status\", \"class_id\") \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            STUDENT_COLUMNS
        );
        let row = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(&student.name)
            .bind(student.birth_date)
            .bind(&student.email)
            .bind(student.status.as_str())
            .bind(student.class_id)
            .fetch_one(&mut *tx)
            .await?;
        let created = Student::try_from(row)?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update_student(&self, id: i64, student: &NewStudent) -> Result<Student, StoreError> {
        let mut tx = self.pool.begin().await?;
        // Class lock first, then the student row, the same order enroll uses
        let target = match student.class_id {
            Some(class_id) => Some(Self::lock_class(&mut tx, class_id).await?),
            None => None,
        };
        let current = Self::lock_student(&mut tx, id).await?;
        if let Some(class) = &target {
            let enrolled = Self::count_enrolled(&mut tx, class.id).await?;
            check_seat(class, enrolled, current.class_id)?;
        }

        let updated = Self::write_student(&mut tx, id, &student.clone().into_student(id)).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_student(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM \"students\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::StudentNotFound(id));
        }
        Ok(())
    }

    async fn list_classes(&self) -> Result<Vec<ClassSummary>, StoreError> {
        let sql = format!("{} GROUP BY c.\"id\" ORDER BY c.\"id\" ASC", CLASS_SUMMARY_SQL);
        let rows = sqlx::query_as::<_, ClassSummaryRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ClassSummary::from).collect())
    }

    async fn get_class(&self, id: i64) -> Result<Option<ClassSummary>, StoreError> {
        let sql = format!("{} WHERE c.\"id\" = $1 GROUP BY c.\"id\"", CLASS_SUMMARY_SQL);
        let row = sqlx::query_as::<_, ClassSummaryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ClassSummary::from))
    }

    async fn find_class_by_name(&self, name: &str) -> Result<Option<Class>, StoreError> {
        let class = sqlx::query_as::<_, Class>(
            "SELECT \"id\", \"name\", \"capacity\" FROM \"classes\" WHERE \"name\" = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(class)
    }

    async fn insert_class(&self, class: &NewClass) -> Result<Class, StoreError> {
        let created = sqlx::query_as::<_, Class>(
            "INSERT INTO \"classes\" (\"name\", \"capacity\") VALUES ($1, $2) RETURNING \"id\", \"name\", \"capacity\"",
        )
        .bind(&class.name)
        .bind(class.capacity)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_class(&self, id: i64, class: &NewClass) -> Result<ClassSummary, StoreError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_class(&mut tx, id).await?;
        let enrolled = Self::count_enrolled(&mut tx, id).await?;
        if enrolled > i64::from(class.capacity) {
            return Err(StoreError::CapacityBelowOccupancy { capacity: class.capacity, enrolled });
        }

        let updated = sqlx::query_as::<_, Class>(
            "UPDATE \"classes\" SET \"name\" = $2, \"capacity\" = $3 WHERE \"id\" = $1 RETURNING \"id\", \"name\", \"capacity\"",
        )
        .bind(id)
        .bind(&class.name)
        .bind(class.capacity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ClassSummary::new(updated, enrolled))
    }

    async fn delete_class(&self, id: i64) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_class(&mut tx, id).await?;
        let unenrolled = sqlx::query("UPDATE \"students\" SET \"class_id\" = NULL, \"status\" = $2 WHERE \"class_id\" = $1")
            .bind(id)
            .bind(StudentStatus::Inactive.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM \"classes\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(unenrolled)
    }

    async fn enroll(&self, student_id: i64, class_id: i64) -> Result<Enrollment, StoreError> {
        let mut tx = self.pool.begin().await?;
        let class = Self::lock_class(&mut tx, class_id).await?;
        let mut student = Self::lock_student(&mut tx, student_id).await?;
        let enrolled = Self::count_enrolled(&mut tx, class_id).await?;
        check_enrollment(&student, &class, enrolled)?;

        apply_enrollment(&mut student, class_id);
        let student = Self::write_student(&mut tx, student_id, &student).await?;
        tx.commit().await?;

        Ok(Enrollment { student, occupancy: Occupancy::new(&class, enrolled + 1) })
    }

    async fn unenroll(&self, student_id: i64) -> Result<Student, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut student = Self::lock_student(&mut tx, student_id).await?;
        if student.class_id.is_none() {
            return Err(StoreError::NotEnrolled(student_id));
        }
        student.class_id = None;
        student.status = StudentStatus::Inactive;
        let student = Self::write_student(&mut tx, student_id, &student).await?;
        tx.commit().await?;
        Ok(student)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        sqlx::query("TRUNCATE \"students\", \"classes\" RESTART IDENTITY")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use chrono::{NaiveDate, Utc};
    use futures::future::join_all;
    use std::sync::Arc;

    /// Needs a PostgreSQL instance: `DATABASE_URL=... cargo test -- --ignored`
    async fn connect() -> Option<PgStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let mut config = AppConfig::development().database;
        config.url = Some(url);
        config.max_connections = 25;
        config.run_migrations = true;
        let pool = DatabaseManager::connect(&config).await.unwrap();
        Some(PgStore::new(pool))
    }

    #[tokio::test]
    #[ignore]
    async fn concurrent_enrollments_never_overfill_a_class() {
        let Some(store) = connect().await else {
            return;
        };
        let store = Arc::new(store);
        let name = format!("Turma concorrência {}", Utc::now().timestamp_micros());
        let class = store.insert_class(&NewClass { name, capacity: 3 }).await.unwrap();

        let mut ids = vec![];
        for i in 0..20 {
            let student = NewStudent {
                name: format!("Aluno {}", i),
                birth_date: NaiveDate::from_ymd_opt(2012, 5, 1).unwrap(),
                email: None,
                status: StudentStatus::Inactive,
                class_id: None,
            };
            ids.push(store.insert_student(&student).await.unwrap().id);
        }

        let class_id = class.id;
        let attempts = ids.iter().map(|&id| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.enroll(id, class_id).await })
        });
        let results = join_all(attempts).await;
        let succeeded = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
        let full = results
            .iter()
            .filter(|r| matches!(r, Ok(Err(StoreError::CapacityExceeded { .. }))))
            .count();

        assert_eq!(succeeded, 3);
        assert_eq!(full, 17);
        let summary = store.get_class(class_id).await.unwrap().unwrap();
        assert_eq!(summary.enrolled_count, 3);
        assert_eq!(summary.remaining_capacity, 0);

        for id in ids {
            store.delete_student(id).await.unwrap();
        }
        store.delete_class(class_id).await.unwrap();
    }
}
