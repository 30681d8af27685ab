use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid {kind} id: {value}. id must be a positive integer")]
    InvalidId { kind: &'static str, value: i64 },
    #[error("course code must not be empty")]
    EmptyCourseCode,
    #[error("invalid course code length: {0}")]
    InvalidCourseCodeLength(usize),
    #[error("course code must not contain control characters")]
    CourseCodeControlCharacter,
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("invalid {field} length: {len}")]
    InvalidFieldLength { field: &'static str, len: usize },
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}
