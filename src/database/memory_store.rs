use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::models::enrollment::{apply_enrollment, check_enrollment, check_seat};
use crate::database::models::{
    Class, ClassSummary, Enrollment, NewClass, NewStudent, Occupancy, Student, StudentStatus,
};
use crate::database::store::{Store, StoreError};
use crate::filter::Filter;

#[derive(Debug, Default)]
struct Tables {
    students: BTreeMap<i64, Student>,
    classes: BTreeMap<i64, Class>,
    next_student_id: i64,
    next_class_id: i64,
}

impl Tables {
    fn enrolled_in(&self, class_id: i64) -> i64 {
        self.students.values().filter(|s| s.class_id == Some(class_id)).count() as i64
    }

    fn summary(&self, class: &Class) -> ClassSummary {
        ClassSummary::new(class.clone(), self.enrolled_in(class.id))
    }

    fn class(&self, class_id: i64) -> Result<&Class, StoreError> {
        self.classes.get(&class_id).ok_or(StoreError::ClassNotFound(class_id))
    }

    fn email_taken(&self, email: Option<&str>, except_id: Option<i64>) -> bool {
        match email {
            Some(email) => self
                .students
                .values()
                .any(|s| s.email.as_deref() == Some(email) && Some(s.id) != except_id),
            None => false,
        }
    }

    fn name_taken(&self, name: &str, except_id: Option<i64>) -> bool {
        self.classes.values().any(|c| c.name == name && Some(c.id) != except_id)
    }

    fn check_seat_for(&self, class_id: Option<i64>, current_class_id: Option<i64>) -> Result<(), StoreError> {
        if let Some(class_id) = class_id {
            let class = self.class(class_id)?;
            check_seat(class, self.enrolled_in(class_id), current_class_id)?;
        }
        Ok(())
    }
}

/// `Store` kept in process memory. Every write holds the table write lock for
/// its whole check-then-write sequence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_students(&self, filter: &Filter) -> Result<Vec<Student>, StoreError> {
        let tables = self.tables.read().await;
        Ok(filter.apply(tables.students.values().cloned()))
    }

    async fn get_student(&self, id: i64) -> Result<Option<Student>, StoreError> {
        Ok(self.tables.read().await.students.get(&id).cloned())
    }

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.students.values().find(|s| s.email.as_deref() == Some(email)).cloned())
    }

    async fn insert_student(&self, student: &NewStudent) -> Result<Student, StoreError> {
        let mut tables = self.tables.write().await;
        tables.check_seat_for(student.class_id, None)?;
        if tables.email_taken(student.email.as_deref(), None) {
            return Err(StoreError::DuplicateEmail);
        }

        tables.next_student_id += 1;
        let created = student.clone().into_student(tables.next_student_id);
        tables.students.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_student(&self, id: i64, student: &NewStudent) -> Result<Student, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(class_id) = student.class_id {
            tables.class(class_id)?;
        }
        let current_class_id = tables
            .students
            .get(&id)
            .ok_or(StoreError::StudentNotFound(id))?
            .class_id;
        tables.check_seat_for(student.class_id, current_class_id)?;
        if tables.email_taken(student.email.as_deref(), Some(id)) {
            return Err(StoreError::DuplicateEmail);
        }

        let updated = student.clone().into_student(id);
        tables.students.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_student(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.students.remove(&id).map(|_| ()).ok_or(StoreError::StudentNotFound(id))
    }

    async fn list_classes(&self) -> Result<Vec<ClassSummary>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.classes.values().map(|c| tables.summary(c)).collect())
    }

    async fn get_class(&self, id: i64) -> Result<Option<ClassSummary>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.classes.get(&id).map(|c| tables.summary(c)))
    }

    async fn find_class_by_name(&self, name: &str) -> Result<Option<Class>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.classes.values().find(|c| c.name == name).cloned())
    }

    async fn insert_class(&self, class: &NewClass) -> Result<Class, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&class.name, None) {
            return Err(StoreError::DuplicateClassName);
        }

        tables.next_class_id += 1;
        let created = Class { id: tables.next_class_id, name: class.name.clone(), capacity: class.capacity };
        tables.classes.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_class(&self, id: i64, class: &NewClass) -> Result<ClassSummary, StoreError> {
        let mut tables = self.tables.write().await;
        tables.class(id)?;
        if tables.name_taken(&class.name, Some(id)) {
            return Err(StoreError::DuplicateClassName);
        }
        let enrolled = tables.enrolled_in(id);
        if enrolled > i64::from(class.capacity) {
            return Err(StoreError::CapacityBelowOccupancy { capacity: class.capacity, enrolled });
        }

        let updated = Class { id, name: class.name.clone(), capacity: class.capacity };
        tables.classes.insert(id, updated.clone());
        Ok(ClassSummary::new(updated, enrolled))
    }

    async fn delete_class(&self, id: i64) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        tables.classes.remove(&id).ok_or(StoreError::ClassNotFound(id))?;
        let mut unenrolled = 0;
        for student in tables.students.values_mut().filter(|s| s.class_id == Some(id)) {
            student.class_id = None;
            student.status = StudentStatus::Inactive;
            unenrolled += 1;
        }
        Ok(unenrolled)
    }

    async fn enroll(&self, student_id: i64, class_id: i64) -> Result<Enrollment, StoreError> {
        let mut tables = self.tables.write().await;
        let class = tables.class(class_id)?.clone();
        let mut student = tables
            .students
            .get(&student_id)
            .cloned()
            .ok_or(StoreError::StudentNotFound(student_id))?;
        let enrolled = tables.enrolled_in(class_id);
        check_enrollment(&student, &class, enrolled)?;

        apply_enrollment(&mut student, class_id);
        tables.students.insert(student_id, student.clone());
        Ok(Enrollment { student, occupancy: Occupancy::new(&class, enrolled + 1) })
    }

    async fn unenroll(&self, student_id: i64) -> Result<Student, StoreError> {
        let mut tables = self.tables.write().await;
        let student = tables
            .students
            .get_mut(&student_id)
            .ok_or(StoreError::StudentNotFound(student_id))?;
        if student.class_id.is_none() {
            return Err(StoreError::NotEnrolled(student_id));
        }
        student.class_id = None;
        student.status = StudentStatus::Inactive;
        Ok(student.clone())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        *self.tables.write().await = Tables::default();
        Ok(())
    }
}
