use std::fmt;
use std::str::FromStr;

use super::DomainError;

macro_rules! define_id_type {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i32);

        impl $name {
            pub fn new(value: i64) -> Result<Self, DomainError> {
                match i32::try_from(value) {
                    Ok(id) if id > 0 => Ok(Self(id)),
                    _ => Err(DomainError::InvalidId {
                        kind: $kind,
                        value,
                    }),
                }
            }

            pub fn value(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s.trim().parse::<i64>().map_err(|_| DomainError::InvalidId {
                    kind: $kind,
                    value: 0,
                })?;
                Self::new(value)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = DomainError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(i64::from(value))
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.value()
            }
        }
    };
}

define_id_type!(ProfessorId, "professor");
define_id_type!(CourseId, "course");
define_id_type!(ExamId, "exam");
