use crate::entity::{course, exam};
use anyhow::anyhow;
use async_trait::async_trait;
use plagcheck_core::domain::{CourseCode, CourseId, DisplayName, ExamId, ProfessorId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

use super::course_repository::{CourseRecord, SeaOrmCourseRepository};
use super::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamRecord {
    pub id: ExamId,
    pub name: String,
    pub course_id: CourseId,
}

#[derive(Debug, Clone)]
pub struct NewExam {
    pub course_id: CourseId,
    pub name: DisplayName,
}

/// An exam together with the course and professor it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedExam {
    pub exam: ExamRecord,
    pub course_code: CourseCode,
    pub professor_id: ProfessorId,
}

#[async_trait]
pub trait ExamRepository: Send + Sync {
    /// Fails with [`StoreError::NotFound`] when the owning course does not
    /// exist.
    async fn create(&self, new_exam: NewExam) -> Result<ExamRecord>;
    async fn find_by_id(&self, exam_id: ExamId) -> Result<Option<ExamRecord>>;
    async fn list_by_course(&self, course_id: CourseId) -> Result<Vec<ExamRecord>>;
    /// Find the exam only if it belongs to the course with `course_code`
    /// and that course belongs to `professor_id`.
    async fn find_owned(
        &self,
        professor_id: ProfessorId,
        course_code: &CourseCode,
        exam_id: ExamId,
    ) -> Result<Option<OwnedExam>>;
    async fn delete(&self, exam_id: ExamId) -> Result<Option<OwnedExam>>;
}

#[derive(Clone)]
pub struct SeaOrmExamRepository {
    db: DatabaseConnection,
}

impl SeaOrmExamRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: exam::Model) -> Result<ExamRecord> {
        let id = ExamId::try_from(model.id)
            .map_err(|e| anyhow!("invalid exam.id '{}' from database: {e}", model.id))?;
        let course_id = CourseId::try_from(model.course_id).map_err(|e| {
            anyhow!(
                "invalid exam.course_id '{}' from database: {e}",
                model.course_id
            )
        })?;

        Ok(ExamRecord {
            id,
            name: model.name,
            course_id,
        })
    }

    fn map_owned(exam: exam::Model, course: course::Model) -> Result<OwnedExam> {
        let CourseRecord {
            code, professor_id, ..
        } = SeaOrmCourseRepository::map_model(course)?;

        Ok(OwnedExam {
            exam: Self::map_model(exam)?,
            course_code: code,
            professor_id,
        })
    }
}

#[async_trait]
impl ExamRepository for SeaOrmExamRepository {
    async fn create(&self, new_exam: NewExam) -> Result<ExamRecord> {
        let txn = self.db.begin().await?;

        if course::Entity::find_by_id(new_exam.course_id.value())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(StoreError::NotFound("course"));
        }

        let active_model = exam::ActiveModel {
            name: Set(new_exam.name.as_str().to_string()),
            course_id: Set(new_exam.course_id.value()),
            ..Default::default()
        };

        let model = active_model.insert(&txn).await?;
        txn.commit().await?;
        Self::map_model(model)
    }

    async fn find_by_id(&self, exam_id: ExamId) -> Result<Option<ExamRecord>> {
        let model = exam::Entity::find_by_id(exam_id.value())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn list_by_course(&self, course_id: CourseId) -> Result<Vec<ExamRecord>> {
        let models = exam::Entity::find()
            .filter(exam::Column::CourseId.eq(course_id.value()))
            .order_by_asc(exam::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn find_owned(
        &self,
        professor_id: ProfessorId,
        course_code: &CourseCode,
        exam_id: ExamId,
    ) -> Result<Option<OwnedExam>> {
        let found = exam::Entity::find_by_id(exam_id.value())
            .find_also_related(course::Entity)
            .filter(course::Column::Code.eq(course_code.as_str()))
            .filter(course::Column::ProfessorId.eq(professor_id.value()))
            .one(&self.db)
            .await?;

        match found {
            Some((exam, Some(course))) => Self::map_owned(exam, course).map(Some),
            _ => Ok(None),
        }
    }

    async fn delete(&self, exam_id: ExamId) -> Result<Option<OwnedExam>> {
        let txn = self.db.begin().await?;

        let Some((exam, Some(course))) = exam::Entity::find_by_id(exam_id.value())
            .find_also_related(course::Entity)
            .one(&txn)
            .await?
        else {
            return Ok(None);
        };

        exam::Entity::delete_by_id(exam_id.value())
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Self::map_owned(exam, course).map(Some)
    }
}
