mod course_code;
mod error;
mod ids;
mod text;

pub use course_code::CourseCode;
pub use error::DomainError;
pub use ids::{CourseId, ExamId, ProfessorId};
pub use text::{DisplayName, Email, Username};
