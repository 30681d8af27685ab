#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use plagcheck_server::api::{AppState, create_router};
use plagcheck_server::db;
use plagcheck_server::entity::{course, exam, professor};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use serde_json::Value;
use submission_archive::{ExtractLimits, SubmissionStore};
use tempfile::TempDir;
use tower::ServiceExt;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const BOUNDARY: &str = "plagcheck-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub uploads: PathBuf,
    _root: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_limits(ExtractLimits::default(), 8 * 1024 * 1024).await
    }

    pub async fn with_limits(limits: ExtractLimits, max_upload_bytes: usize) -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let database_url = format!("sqlite://{}?mode=rwc", root.path().join("test.db").display());
        let db = db::init_pool_and_migrate(&database_url)
            .await
            .expect("database should initialize");

        let uploads = root.path().join("uploads");
        let store = SubmissionStore::new(uploads.clone(), limits);
        let state = Arc::new(AppState::new(db.clone(), store));

        Self {
            router: create_router(state, max_upload_bytes),
            db,
            uploads,
            _root: root,
        }
    }

    /// Insert professor, course and exam rows with fixed ids.
    pub async fn seed_chain(&self, professor_id: i32, course_id: i32, code: &str, exam_id: i32) {
        let username = format!("prof{professor_id}");
        professor::ActiveModel {
            id: Set(professor_id),
            username: Set(username.clone()),
            password: Set("secret".to_string()),
            name: Set(format!("Professor {professor_id}")),
            email: Set(format!("{username}@example.edu")),
        }
        .insert(&self.db)
        .await
        .expect("insert professor");

        course::ActiveModel {
            id: Set(course_id),
            code: Set(code.to_string()),
            name: Set(format!("Course {code}")),
            professor_id: Set(professor_id),
        }
        .insert(&self.db)
        .await
        .expect("insert course");

        exam::ActiveModel {
            id: Set(exam_id),
            name: Set("Midterm".to_string()),
            course_id: Set(course_id),
        }
        .insert(&self.db)
        .await
        .expect("insert exam");
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read response body")
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("build request"),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .expect("build request"),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("build request"),
        )
        .await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("PUT")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("build request"),
        )
        .await
    }

    pub async fn upload(&self, uri: &str, archive: &[u8]) -> (StatusCode, Value) {
        self.send(multipart_request(uri, "file", Some("submission.zip"), archive))
            .await
    }
}

/// One multipart field: name, optional filename, payload.
pub type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

pub fn multipart_request(
    uri: &str,
    field: &str,
    filename: Option<&str>,
    data: &[u8],
) -> Request<Body> {
    multipart_request_with(uri, &[(field, filename, data)])
}

pub fn multipart_request_with(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for (field, filename, data) in parts {
        let disposition = match filename {
            Some(filename) => format!("form-data; name=\"{field}\"; filename=\"{filename}\""),
            None => format!("form-data; name=\"{field}\""),
        };
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("build multipart request")
}

pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, data) in files {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(data).expect("write zip entry");
    }

    writer.finish().expect("finish zip").into_inner()
}
