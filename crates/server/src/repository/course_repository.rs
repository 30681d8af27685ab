use crate::entity::{course, exam, professor};
use anyhow::anyhow;
use async_trait::async_trait;
use plagcheck_core::domain::{CourseCode, CourseId, DisplayName, ProfessorId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

use super::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRecord {
    pub id: CourseId,
    pub code: CourseCode,
    pub name: String,
    pub professor_id: ProfessorId,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub professor_id: ProfessorId,
    pub code: CourseCode,
    pub name: DisplayName,
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Fails with [`StoreError::NotFound`] when the owning professor does
    /// not exist.
    async fn create(&self, new_course: NewCourse) -> Result<CourseRecord>;
    async fn find_by_id(&self, course_id: CourseId) -> Result<Option<CourseRecord>>;
    async fn list_by_professor(&self, professor_id: ProfessorId) -> Result<Vec<CourseRecord>>;
    /// Delete the course and its exams, returning the deleted course.
    async fn delete(&self, course_id: CourseId) -> Result<Option<CourseRecord>>;
}

#[derive(Clone)]
pub struct SeaOrmCourseRepository {
    db: DatabaseConnection,
}

impl SeaOrmCourseRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub(crate) fn map_model(model: course::Model) -> Result<CourseRecord> {
        let id = CourseId::try_from(model.id)
            .map_err(|e| anyhow!("invalid course.id '{}' from database: {e}", model.id))?;
        let professor_id = ProfessorId::try_from(model.professor_id).map_err(|e| {
            anyhow!(
                "invalid course.professor_id '{}' from database: {e}",
                model.professor_id
            )
        })?;
        let code = CourseCode::new(model.code.clone())
            .map_err(|e| anyhow!("invalid course.code '{}' from database: {e}", model.code))?;

        Ok(CourseRecord {
            id,
            code,
            name: model.name,
            professor_id,
        })
    }
}

#[async_trait]
impl CourseRepository for SeaOrmCourseRepository {
    async fn create(&self, new_course: NewCourse) -> Result<CourseRecord> {
        let txn = self.db.begin().await?;

        if professor::Entity::find_by_id(new_course.professor_id.value())
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(StoreError::NotFound("professor"));
        }

        let active_model = course::ActiveModel {
            code: Set(new_course.code.into_inner()),
            name: Set(new_course.name.as_str().to_string()),
            professor_id: Set(new_course.professor_id.value()),
            ..Default::default()
        };

        let model = active_model.insert(&txn).await?;
        txn.commit().await?;
        Self::map_model(model)
    }

    async fn find_by_id(&self, course_id: CourseId) -> Result<Option<CourseRecord>> {
        let model = course::Entity::find_by_id(course_id.value())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn list_by_professor(&self, professor_id: ProfessorId) -> Result<Vec<CourseRecord>> {
        let models = course::Entity::find()
            .filter(course::Column::ProfessorId.eq(professor_id.value()))
            .order_by_asc(course::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn delete(&self, course_id: CourseId) -> Result<Option<CourseRecord>> {
        let txn = self.db.begin().await?;

        let Some(model) = course::Entity::find_by_id(course_id.value())
            .one(&txn)
            .await?
        else {
            return Ok(None);
        };

        exam::Entity::delete_many()
            .filter(exam::Column::CourseId.eq(course_id.value()))
            .exec(&txn)
            .await?;
        course::Entity::delete_by_id(course_id.value())
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Self::map_model(model).map(Some)
    }
}
