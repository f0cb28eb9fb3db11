use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::error::ServiceResult;
use crate::database::models::{Enrollment, Student};
use crate::database::store::{Store, StoreError};
use crate::validation::{validate_positive, ValidationErrors};

/// Identifiers of an enrollment request, from the JSON body or the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentRequest {
    #[serde(alias = "aluno_id")]
    pub student_id: Option<i64>,
    #[serde(alias = "turma_id")]
    pub class_id: Option<i64>,
}

impl EnrollmentRequest {
    /// Fields present in `self` win over the ones in `fallback`
    pub fn or(self, fallback: EnrollmentRequest) -> Self {
        Self {
            student_id: self.student_id.or(fallback.student_id),
            class_id: self.class_id.or(fallback.class_id),
        }
    }

    fn ids(&self) -> Result<(i64, i64), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let student_id = errors.check("student_id", validate_positive(self.student_id, i64::MAX));
        let class_id = errors.check("class_id", validate_positive(self.class_id, i64::MAX));
        match (student_id, class_id) {
            (Some(student_id), Some(class_id)) => Ok((student_id, class_id)),
            _ => Err(errors),
        }
    }
}

#[derive(Clone)]
pub struct EnrollmentService {
    store: Arc<dyn Store>,
}

impl EnrollmentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Enrolls the student if the class has a free seat and the student is
    /// not already in it. Check and write happen in one store unit of work.
    pub async fn enroll(&self, request: &EnrollmentRequest) -> ServiceResult<Enrollment> {
        let (student_id, class_id) = request.ids()?;
        match self.store.enroll(student_id, class_id).await {
            Ok(enrollment) => {
                info!(
                    "Enrolled student {} in class {} ({}/{})",
                    student_id, class_id, enrollment.occupancy.enrolled_count, enrollment.occupancy.capacity
                );
                Ok(enrollment)
            }
            Err(err @ (StoreError::CapacityExceeded { .. } | StoreError::AlreadyEnrolled { .. })) => {
                warn!("Rejected enrollment of student {} in class {}: {}", student_id, class_id, err);
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn unenroll(&self, student_id: i64) -> ServiceResult<Student> {
        let student = self.store.unenroll(student_id).await?;
        info!("Unenrolled student {}", student_id);
        Ok(student)
    }
}
