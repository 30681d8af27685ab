//! 考试提交归档 API 路由。
//!
//! 上传前先校验 教授 → 课程 → 考试 的归属链，校验失败时不做任何文件系统写入。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
};
use plagcheck_api_types::{FileListResponse, UploadResponse};
use tracing::info;

use super::ApiError;
use super::state::AppState;

const ARCHIVE_FIELD: &str = "file";

/// 创建提交归档相关路由。
pub fn create_submission_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/professors/{prof_id}/courses/{course_code}/exams/{exam_id}/upload",
            post(upload_submission).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/professors/{prof_id}/courses/{course_code}/exams/{exam_id}/files",
            get(list_submission_files),
        )
}

/// 上传考试提交归档，保存后立即解压。
async fn upload_submission(
    State(state): State<Arc<AppState>>,
    Path((prof_id, course_code, exam_id)): Path<(i64, String, i64)>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let owned = state.ownership.resolve(prof_id, &course_code, exam_id).await?;
    let storage = state
        .submissions
        .storage(owned.professor_id, &owned.course_code, owned.exam.id)?;

    let payload = read_archive_field(&mut multipart).await?;
    info!(
        professor_id = %owned.professor_id,
        course_code = %owned.course_code,
        exam_id = %owned.exam.id,
        bytes = payload.len(),
        "submission archive received"
    );

    let store = state.submissions.clone();
    let report = state
        .locks
        .run_exclusive(&storage.dir, move || {
            let storage = store.receive(
                owned.professor_id,
                &owned.course_code,
                owned.exam.id,
                &payload,
            )?;
            store.extract(&storage)
        })
        .await??;

    Ok(Json(UploadResponse {
        message: "archive uploaded and extracted".to_string(),
        files_extracted: report.files_written,
        bytes_extracted: report.bytes_written,
    }))
}

/// 取出 multipart 中的归档文件：名为 `file` 的字段优先，否则取第一个带文件名的字段。
async fn read_archive_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    let mut fallback = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(ARCHIVE_FIELD) {
            return Ok(field.bytes().await?.to_vec());
        }
        if fallback.is_none() && field.file_name().is_some() {
            fallback = Some(field.bytes().await?.to_vec());
        }
    }

    fallback.ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "MISSING_ARCHIVE",
            "multipart body contains no archive file",
        )
    })
}

/// 列出考试已解压的提交文件。
async fn list_submission_files(
    State(state): State<Arc<AppState>>,
    Path((prof_id, course_code, exam_id)): Path<(i64, String, i64)>,
) -> Result<Json<FileListResponse>, ApiError> {
    let owned = state.ownership.resolve(prof_id, &course_code, exam_id).await?;
    let storage = state
        .submissions
        .storage(owned.professor_id, &owned.course_code, owned.exam.id)?;

    let store = state.submissions.clone();
    let dir = storage.dir.clone();
    let files = state
        .locks
        .run_shared(&dir, move || {
            let mut files = store
                .list(&storage)?
                .collect::<submission_archive::Result<Vec<_>>>()?;
            files.sort();
            Ok::<_, submission_archive::ArchiveError>(files)
        })
        .await??;

    Ok(Json(FileListResponse { files }))
}
