use std::fs;
use std::io::Write;

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{ArchiveError, Result};
use crate::layout::ExamStorage;

/// Write the raw archive payload into the exam directory.
///
/// The payload goes to a temporary file in the same directory which is then
/// renamed over `upload.zip`, so readers see either the old or the new
/// archive and never a partial one.
pub fn write_archive(storage: &ExamStorage, payload: &[u8]) -> Result<()> {
    fs::create_dir_all(&storage.dir).map_err(|e| ArchiveError::io(&storage.dir, e))?;

    let mut tmp = NamedTempFile::new_in(&storage.dir).map_err(|e| ArchiveError::io(&storage.dir, e))?;
    tmp.write_all(payload)
        .map_err(|e| ArchiveError::io(tmp.path().to_path_buf(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| ArchiveError::io(tmp.path().to_path_buf(), e))?;

    tmp.persist(&storage.archive)
        .map_err(|e| ArchiveError::io(&storage.archive, e.error))?;

    info!(
        path = %storage.archive.display(),
        bytes = payload.len(),
        "archive stored"
    );
    Ok(())
}
