//! 课程 API 路由。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use plagcheck_api_types::{CourseResponse, CreateCourseRequest};
use plagcheck_core::domain::{CourseCode, CourseId, DisplayName, ProfessorId};
use tracing::info;

use super::state::AppState;
use super::{ApiError, log_artifact_removal};
use crate::repository::{CourseRecord, NewCourse};

/// 创建课程相关路由。
pub fn create_course_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/professors/{prof_id}/courses",
            get(list_courses).post(create_course),
        )
        .route(
            "/courses/{course_id}",
            get(get_course).delete(delete_course),
        )
}

impl From<CourseRecord> for CourseResponse {
    fn from(record: CourseRecord) -> Self {
        Self {
            id: record.id.value(),
            code: record.code.into_inner(),
            name: record.name,
            professor_id: record.professor_id.value(),
        }
    }
}

/// 为教授创建课程，教授不存在时返回 404。
async fn create_course(
    State(state): State<Arc<AppState>>,
    Path(prof_id): Path<i64>,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    let new_course = NewCourse {
        professor_id: ProfessorId::new(prof_id)?,
        code: CourseCode::new(request.code)?,
        name: DisplayName::new(request.name)?,
    };

    let record = state.courses.create(new_course).await?;
    info!(course_id = %record.id, code = %record.code, "course created");
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// 列出教授的课程。
async fn list_courses(
    State(state): State<Arc<AppState>>,
    Path(prof_id): Path<i64>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let professor_id = ProfessorId::new(prof_id)?;

    if state.professors.find_by_id(professor_id).await?.is_none() {
        return Err(ApiError::not_found("professor"));
    }

    let records = state.courses.list_by_professor(professor_id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// 按 id 获取课程。
async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<i64>,
) -> Result<Json<CourseResponse>, ApiError> {
    let record = state
        .courses
        .find_by_id(CourseId::new(course_id)?)
        .await?
        .ok_or_else(|| ApiError::not_found("course"))?;
    Ok(Json(record.into()))
}

/// 删除课程及其考试和上传产物。
async fn delete_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .courses
        .delete(CourseId::new(course_id)?)
        .await?
        .ok_or_else(|| ApiError::not_found("course"))?;
    info!(course_id = %deleted.id, code = %deleted.code, "course deleted with exams");

    let store = state.submissions.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        store.remove_course(deleted.professor_id, &deleted.code)
    })
    .await;
    log_artifact_removal("course", outcome);
    Ok(StatusCode::NO_CONTENT)
}
