use std::sync::Arc;

use tracing::{info, warn};

use super::error::ServiceResult;
use crate::database::models::ClassSummary;
use crate::database::store::{Store, StoreError};
use crate::validation::ClassPayload;

#[derive(Clone)]
pub struct ClassService {
    store: Arc<dyn Store>,
}

impl ClassService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Every class with its current occupancy, ordered by id
    pub async fn list(&self) -> ServiceResult<Vec<ClassSummary>> {
        Ok(self.store.list_classes().await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<ClassSummary> {
        let class = self.store.get_class(id).await?.ok_or(StoreError::ClassNotFound(id))?;
        Ok(class)
    }

    pub async fn create(&self, payload: &ClassPayload) -> ServiceResult<ClassSummary> {
        let class = payload.validate()?;
        self.ensure_name_available(&class.name, None).await?;

        let created = self.store.insert_class(&class).await?;
        info!("Created class {} ({}, capacity {})", created.id, created.name, created.capacity);
        Ok(ClassSummary::new(created, 0))
    }

    pub async fn update(&self, id: i64, payload: &ClassPayload) -> ServiceResult<ClassSummary> {
        let class = payload.validate()?;
        self.get(id).await?;
        self.ensure_name_available(&class.name, Some(id)).await?;

        let updated = self.store.update_class(id, &class).await.map_err(|err| {
            if let StoreError::CapacityBelowOccupancy { capacity, enrolled } = &err {
                warn!("Rejected capacity {} for class {} holding {} students", capacity, id, enrolled);
            }
            err
        })?;
        info!("Updated class {}", id);
        Ok(updated)
    }

    /// Deletes the class; its students stay but lose their class
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let unenrolled = self.store.delete_class(id).await?;
        info!("Deleted class {}, unenrolled {} students", id, unenrolled);
        Ok(())
    }

    async fn ensure_name_available(&self, name: &str, except_id: Option<i64>) -> ServiceResult<()> {
        match self.store.find_class_by_name(name).await? {
            Some(existing) if Some(existing.id) != except_id => Err(StoreError::DuplicateClassName.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::services::ServiceError;

    fn payload(name: &str, capacity: i64) -> ClassPayload {
        ClassPayload { name: Some(name.to_string()), capacity: Some(capacity) }
    }

    #[tokio::test]
    async fn class_names_are_unique() {
        let service = ClassService::new(Arc::new(MemoryStore::new()));
        service.create(&payload("6º Ano A", 25)).await.unwrap();
        let err = service.create(&payload(" 6º Ano A ", 30)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::DuplicateClassName)));
    }

    #[tokio::test]
    async fn new_class_starts_empty() {
        let service = ClassService::new(Arc::new(MemoryStore::new()));
        let class = service.create(&payload("7º Ano A", 28)).await.unwrap();
        assert_eq!(class.enrolled_count, 0);
        assert_eq!(class.remaining_capacity, 28);
        assert_eq!(service.get(class.id).await.unwrap(), class);
    }

    #[tokio::test]
    async fn delete_of_missing_class_is_not_found() {
        let service = ClassService::new(Arc::new(MemoryStore::new()));
        let err = service.delete(9).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::ClassNotFound(9))));
    }
}
