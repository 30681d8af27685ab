use crate::entity::{course, exam, professor};
use anyhow::anyhow;
use async_trait::async_trait;
use plagcheck_core::domain::{DisplayName, Email, ProfessorId, Username};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

use super::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfessorRecord {
    pub id: ProfessorId,
    pub username: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct NewProfessor {
    pub username: Username,
    pub password: String,
    pub name: DisplayName,
    pub email: Email,
}

#[async_trait]
pub trait ProfessorRepository: Send + Sync {
    async fn create(&self, new_professor: NewProfessor) -> Result<ProfessorRecord>;
    async fn find_by_id(&self, professor_id: ProfessorId) -> Result<Option<ProfessorRecord>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<ProfessorRecord>>;
    async fn list(&self) -> Result<Vec<ProfessorRecord>>;
    /// Replace the stored password when `old_password` matches it. Returns
    /// `false` on a mismatch and `NotFound` when the professor is missing.
    async fn update_password(
        &self,
        professor_id: ProfessorId,
        old_password: &str,
        new_password: &str,
    ) -> Result<bool>;
    /// Delete the professor together with their courses and those courses'
    /// exams. Returns `false` when no such professor exists.
    async fn delete(&self, professor_id: ProfessorId) -> Result<bool>;
}

#[derive(Clone)]
pub struct SeaOrmProfessorRepository {
    db: DatabaseConnection,
}

impl SeaOrmProfessorRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: professor::Model) -> Result<ProfessorRecord> {
        let id = ProfessorId::try_from(model.id)
            .map_err(|e| anyhow!("invalid professor.id '{}' from database: {e}", model.id))?;

        Ok(ProfessorRecord {
            id,
            username: model.username,
            name: model.name,
            email: model.email,
        })
    }
}

#[async_trait]
impl ProfessorRepository for SeaOrmProfessorRepository {
    async fn create(&self, new_professor: NewProfessor) -> Result<ProfessorRecord> {
        let active_model = professor::ActiveModel {
            username: Set(new_professor.username.as_str().to_string()),
            password: Set(new_professor.password),
            name: Set(new_professor.name.as_str().to_string()),
            email: Set(new_professor.email.as_str().to_string()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Self::map_model(model)
    }

    async fn find_by_id(&self, professor_id: ProfessorId) -> Result<Option<ProfessorRecord>> {
        let model = professor::Entity::find_by_id(professor_id.value())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<ProfessorRecord>> {
        let model = professor::Entity::find()
            .filter(professor::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn list(&self) -> Result<Vec<ProfessorRecord>> {
        let models = professor::Entity::find()
            .order_by_asc(professor::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn update_password(
        &self,
        professor_id: ProfessorId,
        old_password: &str,
        new_password: &str,
    ) -> Result<bool> {
        let txn = self.db.begin().await?;

        let model = professor::Entity::find_by_id(professor_id.value())
            .one(&txn)
            .await?
            .ok_or(StoreError::NotFound("professor"))?;

        if model.password != old_password {
            return Ok(false);
        }

        let mut active_model: professor::ActiveModel = model.into();
        active_model.password = Set(new_password.to_string());
        active_model.update(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }

    async fn delete(&self, professor_id: ProfessorId) -> Result<bool> {
        let txn = self.db.begin().await?;

        if professor::Entity::find_by_id(professor_id.value())
            .one(&txn)
            .await?
            .is_none()
        {
            return Ok(false);
        }

        let course_ids: Vec<i32> = course::Entity::find()
            .filter(course::Column::ProfessorId.eq(professor_id.value()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|model| model.id)
            .collect();

        if !course_ids.is_empty() {
            exam::Entity::delete_many()
                .filter(exam::Column::CourseId.is_in(course_ids))
                .exec(&txn)
                .await?;
            course::Entity::delete_many()
                .filter(course::Column::ProfessorId.eq(professor_id.value()))
                .exec(&txn)
                .await?;
        }

        professor::Entity::delete_by_id(professor_id.value())
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(true)
    }
}
