pub mod create;
pub mod delete;

pub use create::post as enrollment_post;
pub use delete::delete as enrollment_delete;
