//! Deterministic on-disk layout for submission archives.
//!
//! ```text
//! <root>/p{professor}/c{course_code}/e{exam}/upload.zip
//! <root>/p{professor}/c{course_code}/e{exam}/unzipped/
//! ```

use std::path::{Path, PathBuf};

use plagcheck_core::domain::{CourseCode, ExamId, ProfessorId};

use crate::error::{ArchiveError, Result};

pub const ARCHIVE_FILE_NAME: &str = "upload.zip";
pub const EXTRACTION_DIR_NAME: &str = "unzipped";

/// Resolved storage locations for one exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamStorage {
    pub dir: PathBuf,
    pub archive: PathBuf,
    pub extraction_root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn professor_dir(&self, professor_id: ProfessorId) -> PathBuf {
        self.root.join(format!("p{professor_id}"))
    }

    pub fn course_dir(&self, professor_id: ProfessorId, course_code: &CourseCode) -> Result<PathBuf> {
        let segment = sanitize_segment(course_code.as_str())?;
        Ok(self.professor_dir(professor_id).join(format!("c{segment}")))
    }

    pub fn exam(
        &self,
        professor_id: ProfessorId,
        course_code: &CourseCode,
        exam_id: ExamId,
    ) -> Result<ExamStorage> {
        let dir = self
            .course_dir(professor_id, course_code)?
            .join(format!("e{exam_id}"));

        Ok(ExamStorage {
            archive: dir.join(ARCHIVE_FILE_NAME),
            extraction_root: dir.join(EXTRACTION_DIR_NAME),
            dir,
        })
    }
}

/// Turn free text into a single safe path segment.
///
/// Every byte outside `[A-Za-z0-9-._~]` is percent-encoded, so separators
/// never survive and distinct inputs map to distinct segments.
pub fn sanitize_segment(raw: &str) -> Result<String> {
    let encoded = urlencoding::encode(raw).into_owned();

    if encoded.is_empty() || encoded == "." || encoded.contains("..") {
        return Err(ArchiveError::InvalidIdentifier(raw.to_string()));
    }

    Ok(encoded)
}
