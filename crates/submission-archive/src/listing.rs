use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ArchiveError, Result};

/// Lazy walk over the regular files below an extraction root.
///
/// Yields paths relative to the root with `/` separators. Symlinks are not
/// followed and directories are skipped. Every call to [`list_files`] starts
/// a fresh walk.
pub struct FileListing {
    root: PathBuf,
    walker: walkdir::IntoIter,
}

pub fn list_files(root: &Path) -> Result<FileListing> {
    if !root.is_dir() {
        return Err(ArchiveError::NotFound(root.to_path_buf()));
    }

    Ok(FileListing {
        root: root.to_path_buf(),
        walker: WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter(),
    })
}

impl FileListing {
    fn relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Iterator for FileListing {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                    return Some(Err(ArchiveError::io(path, source)));
                }
            };

            if entry.file_type().is_file() {
                return Some(Ok(self.relative(entry.path())));
            }
        }
    }
}
