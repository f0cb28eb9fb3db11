pub mod class;
pub mod enrollment;
pub mod student;

pub use class::{Class, ClassSummary, NewClass};
pub use enrollment::{Enrollment, Occupancy};
pub use student::{NewStudent, Student, StudentStatus};
