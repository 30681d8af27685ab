//! 教授 API 路由。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use plagcheck_api_types::{CreateProfessorRequest, ProfessorResponse, UpdatePasswordRequest};
use plagcheck_core::domain::{DisplayName, Email, ProfessorId, Username};
use tracing::{info, warn};

use super::state::AppState;
use super::{ApiError, log_artifact_removal};
use crate::repository::{NewProfessor, ProfessorRecord};

/// 创建教授相关路由。
pub fn create_professor_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/professors", get(list_professors).post(create_professor))
        .route(
            "/professors/{prof_id}",
            get(get_professor).delete(delete_professor),
        )
        .route("/professors/{prof_id}/password", put(update_password))
        .route(
            "/professors/by-username/{username}",
            get(get_professor_by_username),
        )
}

impl From<ProfessorRecord> for ProfessorResponse {
    fn from(record: ProfessorRecord) -> Self {
        Self {
            id: record.id.value(),
            username: record.username,
            name: record.name,
            email: record.email,
        }
    }
}

/// 创建教授，用户名或邮箱重复时返回 409。
async fn create_professor(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateProfessorRequest>,
) -> Result<(StatusCode, Json<ProfessorResponse>), ApiError> {
    require_password(&request.password)?;

    let new_professor = NewProfessor {
        username: Username::new(request.username)?,
        password: request.password,
        name: DisplayName::new(request.name)?,
        email: Email::new(request.email)?,
    };

    let record = state.professors.create(new_professor).await?;
    info!(professor_id = %record.id, username = %record.username, "professor created");
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// 列出所有教授。
async fn list_professors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProfessorResponse>>, ApiError> {
    let records = state.professors.list().await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// 按 id 获取教授。
async fn get_professor(
    State(state): State<Arc<AppState>>,
    Path(prof_id): Path<i64>,
) -> Result<Json<ProfessorResponse>, ApiError> {
    let professor_id = ProfessorId::new(prof_id)?;
    let record = state
        .professors
        .find_by_id(professor_id)
        .await?
        .ok_or_else(|| ApiError::not_found("professor"))?;
    Ok(Json(record.into()))
}

/// 按用户名获取教授。
async fn get_professor_by_username(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ProfessorResponse>, ApiError> {
    let record = state
        .professors
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("professor"))?;
    Ok(Json(record.into()))
}

/// 删除教授及其课程、考试和上传产物。
async fn delete_professor(
    State(state): State<Arc<AppState>>,
    Path(prof_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let professor_id = ProfessorId::new(prof_id)?;

    if !state.professors.delete(professor_id).await? {
        return Err(ApiError::not_found("professor"));
    }
    info!(%professor_id, "professor deleted with courses and exams");

    let store = state.submissions.clone();
    let outcome = tokio::task::spawn_blocking(move || store.remove_professor(professor_id)).await;
    log_artifact_removal("professor", outcome);
    Ok(StatusCode::NO_CONTENT)
}

/// 修改教授密码，旧密码不匹配时返回 400。
async fn update_password(
    State(state): State<Arc<AppState>>,
    Path(prof_id): Path<i64>,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let professor_id = ProfessorId::new(prof_id)?;
    require_password(&request.new_password)?;

    let updated = state
        .professors
        .update_password(professor_id, &request.old_password, &request.new_password)
        .await?;
    if !updated {
        warn!(%professor_id, "password change rejected: old password mismatch");
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "INVALID_CREDENTIALS",
            "old password does not match",
        ));
    }

    info!(%professor_id, "professor password updated");
    Ok(StatusCode::NO_CONTENT)
}

fn require_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "INVALID_FIELD",
            "password must not be empty",
        ));
    }
    Ok(())
}
