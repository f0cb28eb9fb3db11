// Handlers grouped per resource, mounted by `server::app`
pub mod classes;
pub mod enrollments;
pub mod students;
pub mod utils;
