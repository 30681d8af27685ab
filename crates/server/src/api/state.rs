//! 统一的应用状态。

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use submission_archive::SubmissionStore;

use crate::locks::ExamLocks;
use crate::ownership::OwnershipResolver;
use crate::repository::{
    CourseRepository, ExamRepository, ProfessorRepository, SeaOrmCourseRepository,
    SeaOrmExamRepository, SeaOrmProfessorRepository,
};

/// 统一的应用状态，包含所有 handler 共享的依赖。
#[derive(Clone)]
pub struct AppState {
    /// 教授仓储。
    pub professors: Arc<dyn ProfessorRepository>,
    /// 课程仓储。
    pub courses: Arc<dyn CourseRepository>,
    /// 考试仓储。
    pub exams: Arc<dyn ExamRepository>,
    /// 教授 → 课程 → 考试 归属校验。
    pub ownership: OwnershipResolver,
    /// 提交归档的文件系统存储。
    pub submissions: SubmissionStore,
    /// 按考试目录划分的读写锁。
    pub locks: ExamLocks,
}

impl AppState {
    /// 基于数据库连接创建 sea-orm 仓储。
    pub fn new(db: DatabaseConnection, submissions: SubmissionStore) -> Self {
        let exams: Arc<dyn ExamRepository> = Arc::new(SeaOrmExamRepository::new(db.clone()));

        Self {
            professors: Arc::new(SeaOrmProfessorRepository::new(db.clone())),
            courses: Arc::new(SeaOrmCourseRepository::new(db)),
            ownership: OwnershipResolver::new(exams.clone()),
            exams,
            submissions,
            locks: ExamLocks::new(),
        }
    }
}
