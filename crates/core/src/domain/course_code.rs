use std::fmt;

use super::DomainError;

/// Human-readable course code such as `CS101`.
///
/// Codes are compared byte-for-byte; no trimming or case folding happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseCode(String);

impl CourseCode {
    pub const MAX_LEN: usize = 64;

    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.trim().is_empty() {
            return Err(DomainError::EmptyCourseCode);
        }

        let len = value.chars().count();
        if len > Self::MAX_LEN {
            return Err(DomainError::InvalidCourseCodeLength(len));
        }

        if value.chars().any(char::is_control) {
            return Err(DomainError::CourseCodeControlCharacter);
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
