use serde::{Deserialize, Serialize};

use super::class::Class;
use super::student::{Student, StudentStatus};
use crate::database::store::StoreError;

/// Seats taken and left in a class at a given moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub class_id: i64,
    pub capacity: i32,
    pub enrolled_count: i64,
    pub remaining_capacity: i64,
}

impl Occupancy {
    pub fn new(class: &Class, enrolled_count: i64) -> Self {
        Self {
            class_id: class.id,
            capacity: class.capacity,
            enrolled_count,
            remaining_capacity: (i64::from(class.capacity) - enrolled_count).max(0),
        }
    }

    pub fn is_full(&self) -> bool {
        self.enrolled_count >= i64::from(self.capacity)
    }
}

/// Result of a successful enrollment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub student: Student,
    pub occupancy: Occupancy,
}

/// Checks whether `student` may be enrolled into `class` which currently holds
/// `enrolled_count` students. Callers must hold the class lock while checking
/// and writing.
pub fn check_enrollment(student: &Student, class: &Class, enrolled_count: i64) -> Result<(), StoreError> {
    if Occupancy::new(class, enrolled_count).is_full() {
        return Err(StoreError::CapacityExceeded { class_id: class.id, capacity: class.capacity });
    }
    if student.class_id == Some(class.id) {
        return Err(StoreError::AlreadyEnrolled { student_id: student.id, class_id: class.id });
    }
    Ok(())
}

/// Checks that a direct `class_id` assignment (create/update) fits in `class`.
/// `current_class_id` is the class the student is leaving, if any.
pub fn check_seat(class: &Class, enrolled_count: i64, current_class_id: Option<i64>) -> Result<(), StoreError> {
    if current_class_id == Some(class.id) {
        return Ok(());
    }
    if Occupancy::new(class, enrolled_count).is_full() {
        return Err(StoreError::CapacityExceeded { class_id: class.id, capacity: class.capacity });
    }
    Ok(())
}

/// Applies an accepted enrollment to the student
pub fn apply_enrollment(student: &mut Student, class_id: i64) {
    student.class_id = Some(class_id);
    student.status = StudentStatus::Active;
}
