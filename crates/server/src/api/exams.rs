//! 考试 API 路由。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use plagcheck_api_types::{CreateExamRequest, ExamResponse};
use plagcheck_core::domain::{CourseId, DisplayName, ExamId};
use tracing::info;

use super::state::AppState;
use super::{ApiError, log_artifact_removal};
use crate::repository::{ExamRecord, NewExam};

/// 创建考试相关路由。
pub fn create_exam_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/courses/{course_id}/exams",
            get(list_exams).post(create_exam),
        )
        .route("/exams/{exam_id}", get(get_exam).delete(delete_exam))
}

impl From<ExamRecord> for ExamResponse {
    fn from(record: ExamRecord) -> Self {
        Self {
            id: record.id.value(),
            name: record.name,
            course_id: record.course_id.value(),
        }
    }
}

/// 为课程创建考试，课程不存在时返回 404。
async fn create_exam(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<i64>,
    Json(request): Json<CreateExamRequest>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    let new_exam = NewExam {
        course_id: CourseId::new(course_id)?,
        name: DisplayName::new(request.name)?,
    };

    let record = state.exams.create(new_exam).await?;
    info!(exam_id = %record.id, course_id = %record.course_id, "exam created");
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// 列出课程的考试。
async fn list_exams(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<i64>,
) -> Result<Json<Vec<ExamResponse>>, ApiError> {
    let course_id = CourseId::new(course_id)?;

    if state.courses.find_by_id(course_id).await?.is_none() {
        return Err(ApiError::not_found("course"));
    }

    let records = state.exams.list_by_course(course_id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// 按 id 获取考试。
async fn get_exam(
    State(state): State<Arc<AppState>>,
    Path(exam_id): Path<i64>,
) -> Result<Json<ExamResponse>, ApiError> {
    let record = state
        .exams
        .find_by_id(ExamId::new(exam_id)?)
        .await?
        .ok_or_else(|| ApiError::not_found("exam"))?;
    Ok(Json(record.into()))
}

/// 删除考试及其上传产物。
async fn delete_exam(
    State(state): State<Arc<AppState>>,
    Path(exam_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .exams
        .delete(ExamId::new(exam_id)?)
        .await?
        .ok_or_else(|| ApiError::not_found("exam"))?;
    info!(exam_id = %deleted.exam.id, "exam deleted");

    // 无法映射到存储路径的课程代码从未产生过上传产物。
    let Ok(storage) = state.submissions.storage(
        deleted.professor_id,
        &deleted.course_code,
        deleted.exam.id,
    ) else {
        return Ok(StatusCode::NO_CONTENT);
    };

    // 持有考试写锁删除，避免与进行中的上传交错。
    let store = state.submissions.clone();
    let outcome = state
        .locks
        .run_exclusive(&storage.dir, move || {
            store.remove_exam(deleted.professor_id, &deleted.course_code, deleted.exam.id)
        })
        .await;
    log_artifact_removal("exam", outcome);
    Ok(StatusCode::NO_CONTENT)
}
