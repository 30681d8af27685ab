//! Safe ZIP extraction.
//!
//! Entries are written into a staging directory beside the target. The
//! staging directory replaces the target only after every entry passed the
//! checks, so a failed extraction never leaves a partial tree behind.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::{error, info, warn};
use zip::ZipArchive;

use crate::error::{ArchiveError, Result};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

const S_IFMT: u32 = 0o170_000;
const S_IFREG: u32 = 0o100_000;
const S_IFDIR: u32 = 0o040_000;

/// Resource limits applied while extracting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractLimits {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_max_entry_bytes")]
    pub max_entry_bytes: u64,
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,
}

fn default_max_entries() -> usize {
    10_000
}

fn default_max_entry_bytes() -> u64 {
    100 * 1024 * 1024
}

fn default_max_total_bytes() -> u64 {
    512 * 1024 * 1024
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_entry_bytes: default_max_entry_bytes(),
            max_total_bytes: default_max_total_bytes(),
        }
    }
}

/// Summary of a successful extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub files_written: u64,
    pub directories_created: u64,
    pub bytes_written: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
}

/// Extract the archive at `archive_path` so that its contents end up in
/// `target_dir`, replacing whatever was there.
pub fn extract(
    archive_path: &Path,
    target_dir: &Path,
    limits: &ExtractLimits,
) -> Result<ExtractionReport> {
    let file = File::open(archive_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ArchiveError::NotFound(archive_path.to_path_buf()),
        _ => ArchiveError::io(archive_path, e),
    })?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    if archive.len() > limits.max_entries {
        warn!(
            archive = %archive_path.display(),
            entries = archive.len(),
            limit = limits.max_entries,
            "archive rejected: too many entries"
        );
        return Err(ArchiveError::TooManyEntries {
            limit: limits.max_entries,
        });
    }

    let parent = match target_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| ArchiveError::io(&parent, e))?;

    let staging = tempfile::Builder::new()
        .prefix(".unzipped-")
        .tempdir_in(&parent)
        .map_err(|e| ArchiveError::io(&parent, e))?;

    let report = match extract_entries(&mut archive, staging.path(), limits) {
        Ok(report) => report,
        Err(err) => {
            warn!(archive = %archive_path.display(), error = %err, "extraction rejected");
            return Err(err);
        }
    };

    install(staging, target_dir)?;

    info!(
        archive = %archive_path.display(),
        target = %target_dir.display(),
        files = report.files_written,
        bytes = report.bytes_written,
        "archive extracted"
    );
    Ok(report)
}

fn extract_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    root: &Path,
    limits: &ExtractLimits,
) -> Result<ExtractionReport> {
    let mut report = ExtractionReport::default();
    let mut declared_total = 0u64;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();

        let declared = entry.size();
        if declared > limits.max_entry_bytes {
            return Err(ArchiveError::EntryTooLarge {
                entry: name,
                limit: limits.max_entry_bytes,
            });
        }
        declared_total = declared_total.saturating_add(declared);
        if declared_total > limits.max_total_bytes {
            return Err(ArchiveError::TotalTooLarge {
                limit: limits.max_total_bytes,
            });
        }

        let relative = normalize_entry_path(&name)?;
        let target = root.join(&relative);
        if !target.starts_with(root) {
            return Err(ArchiveError::PathTraversal { entry: name });
        }

        match entry_kind(&name, entry.is_dir(), entry.unix_mode())? {
            EntryKind::Directory => {
                if target.is_file() {
                    return Err(ArchiveError::MalformedArchive(format!(
                        "directory entry '{name}' collides with a file"
                    )));
                }
                fs::create_dir_all(&target).map_err(|e| ArchiveError::io(&target, e))?;
                report.directories_created += 1;
            }
            EntryKind::File => {
                if relative.as_os_str().is_empty() {
                    return Err(ArchiveError::MalformedArchive(format!(
                        "file entry '{name}' has no name"
                    )));
                }
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| match e.kind() {
                        io::ErrorKind::AlreadyExists | io::ErrorKind::NotADirectory => {
                            ArchiveError::MalformedArchive(format!(
                                "entry '{name}' is nested under a file"
                            ))
                        }
                        _ => ArchiveError::io(parent, e),
                    })?;
                }

                let mut out = File::create_new(&target).map_err(|e| match e.kind() {
                    io::ErrorKind::AlreadyExists => ArchiveError::MalformedArchive(format!(
                        "entry '{name}' appears more than once"
                    )),
                    _ => ArchiveError::io(&target, e),
                })?;

                let remaining = limits.max_total_bytes - report.bytes_written;
                let allowance = limits.max_entry_bytes.min(remaining);
                let Some(written) = copy_bounded(&mut entry, &mut out, allowance, &target)? else {
                    // The metadata under-reported the entry size.
                    return Err(if limits.max_entry_bytes <= remaining {
                        ArchiveError::EntryTooLarge {
                            entry: name,
                            limit: limits.max_entry_bytes,
                        }
                    } else {
                        ArchiveError::TotalTooLarge {
                            limit: limits.max_total_bytes,
                        }
                    });
                };

                report.files_written += 1;
                report.bytes_written += written;
            }
        }
    }

    Ok(report)
}

/// Copy at most `allowance` bytes. Returns `None` as soon as the reader has
/// more than that, before any of the excess is written.
fn copy_bounded<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    allowance: u64,
    target: &Path,
) -> Result<Option<u64>> {
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(Some(written)),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ArchiveError::MalformedArchive(e.to_string())),
        };

        if written + n as u64 > allowance {
            return Ok(None);
        }

        writer
            .write_all(&buf[..n])
            .map_err(|e| ArchiveError::io(target, e))?;
        written += n as u64;
    }
}

/// Normalize a stored entry name into a relative path.
///
/// `\` counts as a separator, `.` is dropped and `..` removes the previous
/// component. Names that are absolute, drive-prefixed, contain NUL or climb
/// above the root are rejected.
fn normalize_entry_path(name: &str) -> Result<PathBuf> {
    let traversal = || ArchiveError::PathTraversal {
        entry: name.to_string(),
    };

    if name.contains('\0') {
        return Err(traversal());
    }

    let unified = name.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(traversal());
    }

    let mut parts: Vec<&str> = Vec::new();
    for (position, part) in unified.split('/').enumerate() {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(traversal());
                }
            }
            _ if position == 0 && is_drive_prefix(part) => return Err(traversal()),
            _ => parts.push(part),
        }
    }

    Ok(parts.iter().collect())
}

fn is_drive_prefix(part: &str) -> bool {
    let bytes = part.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn entry_kind(name: &str, is_dir: bool, unix_mode: Option<u32>) -> Result<EntryKind> {
    if let Some(mode) = unix_mode {
        match mode & S_IFMT {
            S_IFDIR => return Ok(EntryKind::Directory),
            0 | S_IFREG => {}
            _ => {
                return Err(ArchiveError::UnsupportedEntryType {
                    entry: name.to_string(),
                });
            }
        }
    }

    Ok(if is_dir {
        EntryKind::Directory
    } else {
        EntryKind::File
    })
}

/// Swap the staged tree into place, keeping the previous tree until the new
/// one has been renamed in.
fn install(staging: TempDir, target: &Path) -> Result<()> {
    let backup = staging.path().with_extension("old");
    let had_previous = target.exists();

    if had_previous {
        fs::rename(target, &backup).map_err(|e| ArchiveError::io(target, e))?;
    }

    if let Err(e) = fs::rename(staging.path(), target) {
        if had_previous {
            if let Err(restore) = fs::rename(&backup, target) {
                error!(
                    backup = %backup.display(),
                    target = %target.display(),
                    error = %restore,
                    "failed to restore previous extraction"
                );
            }
        }
        return Err(ArchiveError::io(target, e));
    }

    if had_previous {
        if let Err(e) = fs::remove_dir_all(&backup) {
            warn!(path = %backup.display(), error = %e, "failed to remove previous extraction");
        }
    }

    // `staging` no longer exists on disk; dropping it is a no-op.
    drop(staging);
    Ok(())
}
