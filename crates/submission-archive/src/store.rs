use std::fs;
use std::path::{Path, PathBuf};

use plagcheck_core::domain::{CourseCode, ExamId, ProfessorId};
use tracing::info;

use crate::error::{ArchiveError, Result};
use crate::extract::{ExtractLimits, ExtractionReport, extract};
use crate::layout::{ExamStorage, StorageLayout};
use crate::listing::{FileListing, list_files};
use crate::receiver::write_archive;

/// Filesystem side of exam submissions: one archive and one extraction
/// tree per exam below a configured root.
#[derive(Debug, Clone)]
pub struct SubmissionStore {
    layout: StorageLayout,
    limits: ExtractLimits,
}

impl SubmissionStore {
    pub fn new(root: impl Into<PathBuf>, limits: ExtractLimits) -> Self {
        Self {
            layout: StorageLayout::new(root),
            limits,
        }
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn limits(&self) -> &ExtractLimits {
        &self.limits
    }

    pub fn storage(
        &self,
        professor_id: ProfessorId,
        course_code: &CourseCode,
        exam_id: ExamId,
    ) -> Result<ExamStorage> {
        self.layout.exam(professor_id, course_code, exam_id)
    }

    /// Persist a raw archive for an exam whose ownership chain has already
    /// been resolved.
    pub fn receive(
        &self,
        professor_id: ProfessorId,
        course_code: &CourseCode,
        exam_id: ExamId,
        payload: &[u8],
    ) -> Result<ExamStorage> {
        let storage = self.storage(professor_id, course_code, exam_id)?;
        write_archive(&storage, payload)?;
        Ok(storage)
    }

    pub fn extract(&self, storage: &ExamStorage) -> Result<ExtractionReport> {
        extract(&storage.archive, &storage.extraction_root, &self.limits)
    }

    pub fn list(&self, storage: &ExamStorage) -> Result<FileListing> {
        list_files(&storage.extraction_root)
    }

    pub fn remove_professor(&self, professor_id: ProfessorId) -> Result<bool> {
        remove_tree(&self.layout.professor_dir(professor_id))
    }

    pub fn remove_course(&self, professor_id: ProfessorId, course_code: &CourseCode) -> Result<bool> {
        remove_tree(&self.layout.course_dir(professor_id, course_code)?)
    }

    pub fn remove_exam(
        &self,
        professor_id: ProfessorId,
        course_code: &CourseCode,
        exam_id: ExamId,
    ) -> Result<bool> {
        remove_tree(&self.storage(professor_id, course_code, exam_id)?.dir)
    }
}

fn remove_tree(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            info!(path = %path.display(), "removed submission artifacts");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ArchiveError::io(path, e)),
    }
}
