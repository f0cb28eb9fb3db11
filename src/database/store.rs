use async_trait::async_trait;
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::database::models::{Class, ClassSummary, Enrollment, NewClass, NewStudent, Student};
use crate::filter::Filter;

/// Failures a store reports. Business rule rejections are detected inside the
/// store's unit of work so they stay consistent under concurrent requests.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("student {0} not found")]
    StudentNotFound(i64),

    #[error("class {0} not found")]
    ClassNotFound(i64),

    #[error("email already in use")]
    DuplicateEmail,

    #[error("class name already in use")]
    DuplicateClassName,

    #[error("class {class_id} is full ({capacity} seats)")]
    CapacityExceeded { class_id: i64, capacity: i32 },

    #[error("student {student_id} is already enrolled in class {class_id}")]
    AlreadyEnrolled { student_id: i64, class_id: i64 },

    #[error("student {0} is not enrolled in any class")]
    NotEnrolled(i64),

    #[error("capacity {capacity} is below the {enrolled} students already enrolled")]
    CapacityBelowOccupancy { capacity: i32, enrolled: i64 },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                match db_err.constraint() {
                    Some("students_email_key") => return StoreError::DuplicateEmail,
                    Some("classes_name_key") => return StoreError::DuplicateClassName,
                    _ => {}
                }
            }
        }
        StoreError::Database(DatabaseError::Sqlx(err))
    }
}

/// Persistent storage for students and classes.
///
/// Every mutating method is one unit of work: either all of its effects are
/// visible afterwards or none are.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs and `/health`
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), StoreError>;

    async fn list_students(&self, filter: &Filter) -> Result<Vec<Student>, StoreError>;

    async fn get_student(&self, id: i64) -> Result<Option<Student>, StoreError>;

    async fn find_student_by_email(&self, email: &str) -> Result<Option<Student>, StoreError>;

    /// Fails with `ClassNotFound` / `CapacityExceeded` when `class_id` is set
    /// and the class is missing or full.
    async fn insert_student(&self, student: &NewStudent) -> Result<Student, StoreError>;

    /// Replaces every field of student `id`, with the same class checks as insert
    async fn update_student(&self, id: i64, student: &NewStudent) -> Result<Student, StoreError>;

    async fn delete_student(&self, id: i64) -> Result<(), StoreError>;

    async fn list_classes(&self) -> Result<Vec<ClassSummary>, StoreError>;

    async fn get_class(&self, id: i64) -> Result<Option<ClassSummary>, StoreError>;

    async fn find_class_by_name(&self, name: &str) -> Result<Option<Class>, StoreError>;

    async fn insert_class(&self, class: &NewClass) -> Result<Class, StoreError>;

    /// Fails with `CapacityBelowOccupancy` if the new capacity cannot hold the
    /// students already enrolled.
    async fn update_class(&self, id: i64, class: &NewClass) -> Result<ClassSummary, StoreError>;

    /// Deletes the class and unenrolls its students, marking them inactive.
    /// Returns how many were unenrolled.
    async fn delete_class(&self, id: i64) -> Result<u64, StoreError>;

    /// Enrolls a student, checking existence, capacity and current membership
    /// atomically with the write.
    async fn enroll(&self, student_id: i64, class_id: i64) -> Result<Enrollment, StoreError>;

    /// Removes a student from their class and marks them inactive
    async fn unenroll(&self, student_id: i64) -> Result<Student, StoreError>;

    /// Removes every student and class
    async fn reset(&self) -> Result<(), StoreError>;
}
