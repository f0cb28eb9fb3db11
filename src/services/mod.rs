pub mod class_service;
pub mod enrollment_service;
pub mod error;
pub mod export_service;
pub mod student_service;

use std::sync::Arc;

use crate::config::FilterConfig;
use crate::database::Store;

pub use class_service::ClassService;
pub use enrollment_service::{EnrollmentRequest, EnrollmentService};
pub use error::{ServiceError, ServiceResult};
pub use export_service::{ExportDocument, ExportFormat, ExportService};
pub use student_service::StudentService;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub students: StudentService,
    pub classes: ClassService,
    pub enrollments: EnrollmentService,
    pub exports: ExportService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, filter_config: FilterConfig) -> Self {
        Self {
            students: StudentService::new(store.clone(), filter_config),
            classes: ClassService::new(store.clone()),
            enrollments: EnrollmentService::new(store.clone()),
            exports: ExportService::new(store.clone()),
            store,
        }
    }
}
