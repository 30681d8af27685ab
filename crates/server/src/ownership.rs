//! Professor → course → exam ownership check guarding archive operations.

use std::sync::Arc;

use plagcheck_core::domain::{CourseCode, DomainError, ExamId, ProfessorId};
use thiserror::Error;
use tracing::{debug, warn};

use crate::repository::{ExamRepository, OwnedExam, StoreError};

#[derive(Debug, Error)]
pub enum OwnershipError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] DomainError),

    /// The chain did not resolve. Deliberately carries no detail about which
    /// link was missing.
    #[error("exam not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct OwnershipResolver {
    exams: Arc<dyn ExamRepository>,
}

impl OwnershipResolver {
    pub fn new(exams: Arc<dyn ExamRepository>) -> Self {
        Self { exams }
    }

    pub async fn resolve(
        &self,
        professor_id: i64,
        course_code: &str,
        exam_id: i64,
    ) -> Result<OwnedExam, OwnershipError> {
        let professor_id = ProfessorId::new(professor_id)?;
        let course_code = CourseCode::new(course_code)?;
        let exam_id = ExamId::new(exam_id)?;

        match self
            .exams
            .find_owned(professor_id, &course_code, exam_id)
            .await?
        {
            Some(owned) => {
                debug!(%professor_id, %course_code, %exam_id, "ownership chain resolved");
                Ok(owned)
            }
            None => {
                warn!(%professor_id, %course_code, %exam_id, "ownership chain not resolved");
                Err(OwnershipError::NotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{ExamRecord, NewExam};
    use async_trait::async_trait;
    use plagcheck_core::domain::CourseId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct StubExams {
        owned: Vec<OwnedExam>,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl ExamRepository for StubExams {
        async fn create(&self, _new_exam: NewExam) -> crate::repository::Result<ExamRecord> {
            unimplemented!("not used by the resolver")
        }

        async fn find_by_id(&self, _exam_id: ExamId) -> crate::repository::Result<Option<ExamRecord>> {
            unimplemented!("not used by the resolver")
        }

        async fn list_by_course(
            &self,
            _course_id: CourseId,
        ) -> crate::repository::Result<Vec<ExamRecord>> {
            unimplemented!("not used by the resolver")
        }

        async fn find_owned(
            &self,
            professor_id: ProfessorId,
            course_code: &CourseCode,
            exam_id: ExamId,
        ) -> crate::repository::Result<Option<OwnedExam>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .owned
                .iter()
                .find(|o| {
                    o.professor_id == professor_id
                        && &o.course_code == course_code
                        && o.exam.id == exam_id
                })
                .cloned())
        }

        async fn delete(&self, _exam_id: ExamId) -> crate::repository::Result<Option<OwnedExam>> {
            unimplemented!("not used by the resolver")
        }
    }

    fn owned(professor: i64, code: &str, exam: i64) -> OwnedExam {
        OwnedExam {
            exam: ExamRecord {
                id: ExamId::new(exam).expect("valid id"),
                name: "Midterm".to_string(),
                course_id: CourseId::new(1).expect("valid id"),
            },
            course_code: CourseCode::new(code).expect("valid code"),
            professor_id: ProfessorId::new(professor).expect("valid id"),
        }
    }

    fn resolver(exams: Arc<StubExams>) -> OwnershipResolver {
        OwnershipResolver::new(exams)
    }

    #[tokio::test]
    async fn exact_chain_resolves() {
        let exams = Arc::new(StubExams {
            owned: vec![owned(1, "CS101", 7)],
            ..Default::default()
        });

        let found = resolver(exams)
            .resolve(1, "CS101", 7)
            .await
            .expect("chain should resolve");

        assert_eq!(found.exam.id.value(), 7);
    }

    #[tokio::test]
    async fn any_altered_link_is_not_found() {
        let exams = Arc::new(StubExams {
            owned: vec![owned(1, "CS101", 7)],
            ..Default::default()
        });
        let resolver = resolver(exams);

        for (professor, code, exam) in [(2, "CS101", 7), (1, "cs101", 7), (1, "CS101", 8)] {
            let err = resolver
                .resolve(professor, code, exam)
                .await
                .expect_err("altered chain should fail");
            assert!(matches!(err, OwnershipError::NotFound));
        }
    }

    #[tokio::test]
    async fn invalid_identifiers_skip_the_lookup() {
        let exams = Arc::new(StubExams::default());
        let resolver = resolver(exams.clone());

        for (professor, code, exam) in [(0, "CS101", 7), (1, "", 7), (1, "CS101", -1)] {
            let err = resolver
                .resolve(professor, code, exam)
                .await
                .expect_err("invalid identifier should fail");
            assert!(matches!(err, OwnershipError::InvalidIdentifier(_)));
        }
        assert_eq!(exams.lookups.load(Ordering::SeqCst), 0);
    }
}
