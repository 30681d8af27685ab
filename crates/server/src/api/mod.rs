//! API 路由模块。

pub mod courses;
pub mod error;
pub mod exams;
pub mod professors;
pub mod state;
pub mod submissions;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use plagcheck_api_types::HealthCheckResponse;

pub use error::ApiError;
pub use state::AppState;

/// 创建完整的 API 路由。
pub fn create_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(professors::create_professor_router())
        .merge(courses::create_course_router())
        .merge(exams::create_exam_router())
        .merge(submissions::create_submission_router(max_upload_bytes))
        .with_state(state)
}

/// 健康检查。
async fn health() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::ok())
}

/// 记录文件系统产物的删除结果；记录已删除时失败只记录日志。
pub(crate) fn log_artifact_removal(
    what: &'static str,
    outcome: Result<submission_archive::Result<bool>, tokio::task::JoinError>,
) {
    match outcome {
        Ok(Ok(_)) => {}
        Ok(Err(err)) => tracing::warn!(error = %err, what, "failed to remove submission artifacts"),
        Err(err) => tracing::warn!(error = %err, what, "artifact removal task failed"),
    }
}
