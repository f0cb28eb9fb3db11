use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::error::ServiceResult;
use crate::config::FilterConfig;
use crate::database::models::Student;
use crate::database::store::{Store, StoreError};
use crate::filter::{Filter, FilterData};
use crate::validation::StudentPayload;

#[derive(Clone)]
pub struct StudentService {
    store: Arc<dyn Store>,
    filter_config: FilterConfig,
}

impl StudentService {
    pub fn new(store: Arc<dyn Store>, filter_config: FilterConfig) -> Self {
        Self { store, filter_config }
    }

    /// Filtered, ordered page of students. Applies the configured default
    /// and maximum limit.
    pub async fn list(&self, data: FilterData) -> ServiceResult<Vec<Student>> {
        let mut filter = Filter::new();
        filter.assign(data)?.paginate(&self.filter_config);
        Ok(self.store.list_students(&filter).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Student> {
        let student = self.store.get_student(id).await?.ok_or(StoreError::StudentNotFound(id))?;
        Ok(student)
    }

    pub async fn create(&self, payload: &StudentPayload) -> ServiceResult<Student> {
        let student = payload.validate(Utc::now().date_naive())?;
        self.ensure_email_available(student.email.as_deref(), None).await?;

        let created = self.store.insert_student(&student).await?;
        info!("Created student {} ({})", created.id, created.name);
        Ok(created)
    }

    /// Replaces every field of an existing student
    pub async fn update(&self, id: i64, payload: &StudentPayload) -> ServiceResult<Student> {
        let student = payload.validate(Utc::now().date_naive())?;
        self.get(id).await?;
        self.ensure_email_available(student.email.as_deref(), Some(id)).await?;

        let updated = self.store.update_student(id, &student).await?;
        info!("Updated student {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.store.delete_student(id).await?;
        info!("Deleted student {}", id);
        Ok(())
    }

    async fn ensure_email_available(&self, email: Option<&str>, except_id: Option<i64>) -> ServiceResult<()> {
        let Some(email) = email else {
            return Ok(());
        };
        match self.store.find_student_by_email(email).await? {
            Some(existing) if Some(existing.id) != except_id => {
                warn!("Rejected duplicate email for student {}", existing.id);
                Err(StoreError::DuplicateEmail.into())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::MemoryStore;
    use crate::services::ServiceError;

    fn service() -> StudentService {
        StudentService::new(Arc::new(MemoryStore::new()), AppConfig::development().filter)
    }

    fn payload(name: &str, email: Option<&str>) -> StudentPayload {
        StudentPayload {
            name: Some(name.to_string()),
            birth_date: Some("2010-03-15".to_string()),
            email: email.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_email_on_create() {
        let service = service();
        service.create(&payload("Ana Silva", Some("dup@x.com"))).await.unwrap();
        let err = service.create(&payload("Bruno Costa", Some("dup@x.com"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn update_may_keep_its_own_email() {
        let service = service();
        let ana = service.create(&payload("Ana Silva", Some("ana@x.com"))).await.unwrap();
        let updated = service.update(ana.id, &payload("Ana Maria Silva", Some("ana@x.com"))).await.unwrap();
        assert_eq!(updated.name, "Ana Maria Silva");
    }

    #[tokio::test]
    async fn update_cannot_take_another_students_email() {
        let service = service();
        service.create(&payload("Ana Silva", Some("ana@x.com"))).await.unwrap();
        let bruno = service.create(&payload("Bruno Costa", Some("bruno@x.com"))).await.unwrap();

        let err = service.update(bruno.id, &payload("Bruno Costa", Some("ana@x.com"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::DuplicateEmail)));
        assert_eq!(service.get(bruno.id).await.unwrap().email.as_deref(), Some("bruno@x.com"));
    }

    #[tokio::test]
    async fn update_of_missing_student_is_not_found() {
        let err = service().update(42, &payload("Ana Silva", None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::StudentNotFound(42))));
    }

    #[tokio::test]
    async fn listing_applies_default_limit() {
        let mut config = AppConfig::development().filter;
        config.default_limit = Some(2);
        let service = StudentService::new(Arc::new(MemoryStore::new()), config);
        for name in ["Ana Silva", "Bruno Costa", "Carla Souza"] {
            service.create(&payload(name, None)).await.unwrap();
        }
        assert_eq!(service.list(FilterData::default()).await.unwrap().len(), 2);
    }
}
