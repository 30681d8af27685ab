//! API 错误类型。

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use plagcheck_api_types::ErrorResponse;
use plagcheck_core::domain::DomainError;
use submission_archive::ArchiveError;
use tracing::error;

use crate::ownership::OwnershipError;
use crate::repository::StoreError;

#[derive(Debug)]
pub struct ApiError {
    message: String,
    code: &'static str,
    status: StatusCode,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            status,
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", format!("{what} not found"))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            message,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<ArchiveError> for ApiError {
    fn from(err: ArchiveError) -> Self {
        let message = err.to_string();
        match err {
            ArchiveError::NotFound(_) => ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "no extracted submission for this exam",
            ),
            ArchiveError::InvalidIdentifier(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_IDENTIFIER", message)
            }
            ArchiveError::Io { .. } => {
                error!(error = %message, "submission storage failure");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", "storage failure")
            }
            ArchiveError::PathTraversal { .. } => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "PATH_TRAVERSAL", message)
            }
            ArchiveError::TooManyEntries { .. } => {
                ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "TOO_MANY_ENTRIES", message)
            }
            ArchiveError::EntryTooLarge { .. } => {
                ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "ENTRY_TOO_LARGE", message)
            }
            ArchiveError::TotalTooLarge { .. } => {
                ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "TOTAL_TOO_LARGE", message)
            }
            ArchiveError::UnsupportedEntryType { .. } => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNSUPPORTED_ENTRY_TYPE",
                message,
            ),
            ArchiveError::MalformedArchive(_) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "MALFORMED_ARCHIVE", message)
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::not_found(what),
            StoreError::Conflict(detail) => ApiError::new(
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("record already exists: {detail}"),
            ),
            StoreError::Database(e) => {
                error!(error = %e, "database failure");
                ApiError::internal("database failure")
            }
            StoreError::Other(e) => {
                error!(error = %e, "entity store failure");
                ApiError::internal("entity store failure")
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, "INVALID_IDENTIFIER", err.to_string())
    }
}

impl From<OwnershipError> for ApiError {
    fn from(err: OwnershipError) -> Self {
        match err {
            OwnershipError::InvalidIdentifier(e) => e.into(),
            OwnershipError::NotFound => ApiError::not_found("exam"),
            OwnershipError::Store(e) => e.into(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        let status = err.status();
        let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "UPLOAD_TOO_LARGE"
        } else {
            "INVALID_MULTIPART"
        };
        ApiError::new(status, code, err.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        error!(error = %err, "blocking task failed");
        ApiError::internal("blocking task failed")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            code: self.code.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}
