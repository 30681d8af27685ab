mod common;

use std::collections::BTreeSet;
use std::fs;

use common::{Entry, forge_uncompressed_size, write_zip, zip_bytes};
use plagcheck_core::domain::{CourseCode, ExamId, ProfessorId};
use submission_archive::{ArchiveError, ExtractLimits, SubmissionStore, extract, list_files};
use tempfile::tempdir;

fn listed(root: &std::path::Path) -> BTreeSet<String> {
    list_files(root)
        .expect("extraction root should exist")
        .collect::<Result<_, _>>()
        .expect("walk should succeed")
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_upload_extract_list_scenario() {
    let root = tempdir().expect("create temp dir");
    let store = SubmissionStore::new(root.path().join("uploads"), ExtractLimits::default());
    let professor = ProfessorId::new(1).expect("valid id");
    let course = CourseCode::new("CS101").expect("valid code");
    let exam = ExamId::new(7).expect("valid id");

    let payload = zip_bytes(&[
        Entry::File("report.pdf", b"%PDF-1.4"),
        Entry::Dir("data/"),
        Entry::File("data/results.csv", b"id,score\n1,90\n"),
    ]);

    let storage = store
        .receive(professor, &course, exam, &payload)
        .expect("receive should succeed");
    assert_eq!(
        storage.archive,
        root.path().join("uploads/p1/cCS101/e7/upload.zip")
    );

    let report = store.extract(&storage).expect("extract should succeed");
    assert_eq!(report.files_written, 2);
    assert_eq!(report.directories_created, 1);
    assert_eq!(report.bytes_written, 8 + 14);

    let files: BTreeSet<String> = store
        .list(&storage)
        .expect("list should succeed")
        .collect::<Result<_, _>>()
        .expect("walk should succeed");
    assert_eq!(files, names(&["report.pdf", "data/results.csv"]));
}

#[test]
fn test_reupload_is_idempotent_and_replaces_old_tree() {
    let root = tempdir().expect("create temp dir");
    let archive = root.path().join("e1/upload.zip");
    let target = root.path().join("e1/unzipped");

    write_zip(&archive, &[Entry::File("old.txt", b"old")]);
    extract(&archive, &target, &ExtractLimits::default()).expect("first extract");

    write_zip(
        &archive,
        &[Entry::File("a.txt", b"a"), Entry::File("b/c.txt", b"c")],
    );
    extract(&archive, &target, &ExtractLimits::default()).expect("second extract");
    let first = listed(&target);
    extract(&archive, &target, &ExtractLimits::default()).expect("third extract");
    let second = listed(&target);

    assert_eq!(first, names(&["a.txt", "b/c.txt"]));
    assert_eq!(first, second);
    assert_eq!(fs::read(target.join("b/c.txt")).expect("read file"), b"c");

    let siblings: Vec<_> = fs::read_dir(root.path().join("e1"))
        .expect("read exam dir")
        .map(|e| e.expect("dir entry").file_name())
        .collect();
    assert_eq!(siblings.len(), 2, "staging directories must be cleaned up");
}

#[test]
fn test_path_traversal_leaves_target_absent() {
    let root = tempdir().expect("create temp dir");
    let archive = root.path().join("upload.zip");
    let target = root.path().join("unzipped");

    write_zip(
        &archive,
        &[
            Entry::File("fine.txt", b"ok"),
            Entry::File("../../etc/passwd", b"root:x:0:0"),
        ],
    );

    let err = extract(&archive, &target, &ExtractLimits::default())
        .expect_err("traversal should be rejected");

    assert!(matches!(err, ArchiveError::PathTraversal { .. }));
    assert!(!target.exists());
    assert!(!root.path().join("etc").exists());
    assert_eq!(fs::read_dir(root.path()).expect("read root").count(), 1);
}

#[test]
fn test_absolute_entry_leaves_previous_extraction_unchanged() {
    let root = tempdir().expect("create temp dir");
    let archive = root.path().join("upload.zip");
    let target = root.path().join("unzipped");

    write_zip(&archive, &[Entry::File("kept.txt", b"kept")]);
    extract(&archive, &target, &ExtractLimits::default()).expect("first extract");

    write_zip(
        &archive,
        &[Entry::File("new.txt", b"new"), Entry::File("/etc/passwd", b"x")],
    );
    let err = extract(&archive, &target, &ExtractLimits::default())
        .expect_err("absolute path should be rejected");

    assert!(matches!(err, ArchiveError::PathTraversal { .. }));
    assert_eq!(listed(&target), names(&["kept.txt"]));
}

#[test]
fn test_entry_over_limit_is_rejected_before_writing() {
    let root = tempdir().expect("create temp dir");
    let archive = root.path().join("upload.zip");
    let target = root.path().join("unzipped");
    let big = vec![b'x'; 4096];

    write_zip(&archive, &[Entry::File("big.bin", &big)]);
    let limits = ExtractLimits {
        max_entry_bytes: 1024,
        ..ExtractLimits::default()
    };

    let err = extract(&archive, &target, &limits).expect_err("entry should be too large");

    assert!(matches!(err, ArchiveError::EntryTooLarge { limit: 1024, .. }));
    assert!(!target.exists());
}

#[test]
fn test_under_reported_entry_size_is_caught_while_copying() {
    let root = tempdir().expect("create temp dir");
    let archive = root.path().join("upload.zip");
    let target = root.path().join("unzipped");
    let big = vec![b'x'; 4096];

    let mut payload = zip_bytes(&[Entry::File("big.bin", &big)]);
    forge_uncompressed_size(&mut payload, 10);
    fs::write(&archive, payload).expect("write archive");
    let limits = ExtractLimits {
        max_entry_bytes: 1024,
        ..ExtractLimits::default()
    };

    let err = extract(&archive, &target, &limits).expect_err("actual bytes exceed the limit");

    assert!(matches!(err, ArchiveError::EntryTooLarge { limit: 1024, .. }), "{err:?}");
    assert!(!target.exists());
}

#[test]
fn test_total_over_limit_is_rejected() {
    let root = tempdir().expect("create temp dir");
    let archive = root.path().join("upload.zip");
    let target = root.path().join("unzipped");
    let chunk = vec![b'y'; 600];

    write_zip(
        &archive,
        &[Entry::File("one.bin", &chunk), Entry::File("two.bin", &chunk)],
    );
    let limits = ExtractLimits {
        max_entries: 10,
        max_entry_bytes: 1000,
        max_total_bytes: 1000,
    };

    let err = extract(&archive, &target, &limits).expect_err("total should be too large");

    assert!(matches!(err, ArchiveError::TotalTooLarge { limit: 1000 }));
    assert!(!target.exists());
}

#[test]
fn test_too_many_entries_is_rejected() {
    let root = tempdir().expect("create temp dir");
    let archive = root.path().join("upload.zip");
    let target = root.path().join("unzipped");

    write_zip(
        &archive,
        &[
            Entry::File("1", b""),
            Entry::File("2", b""),
            Entry::File("3", b""),
        ],
    );
    let limits = ExtractLimits {
        max_entries: 2,
        ..ExtractLimits::default()
    };

    let err = extract(&archive, &target, &limits).expect_err("too many entries");

    assert!(matches!(err, ArchiveError::TooManyEntries { limit: 2 }));
    assert!(!target.exists());
}

#[test]
fn test_symlink_entry_is_unsupported() {
    let root = tempdir().expect("create temp dir");
    let archive = root.path().join("upload.zip");
    let target = root.path().join("unzipped");

    write_zip(
        &archive,
        &[
            Entry::File("a.txt", b"a"),
            Entry::Symlink("link", "/etc/passwd"),
        ],
    );

    let err = extract(&archive, &target, &ExtractLimits::default())
        .expect_err("symlink should be rejected");

    assert!(matches!(err, ArchiveError::UnsupportedEntryType { .. }));
    assert!(!target.exists());
}

#[test]
fn test_zero_byte_and_nested_entries() {
    let root = tempdir().expect("create temp dir");
    let archive = root.path().join("upload.zip");
    let target = root.path().join("unzipped");
    let deep = "a/b/c/d/e/f/g/h/i/j/empty.txt";

    write_zip(&archive, &[Entry::File(deep, b"")]);
    let report = extract(&archive, &target, &ExtractLimits::default()).expect("extract");

    assert_eq!(report.files_written, 1);
    assert_eq!(report.bytes_written, 0);
    assert_eq!(listed(&target), names(&[deep]));
}

#[test]
fn test_duplicate_normalized_paths_are_malformed() {
    let root = tempdir().expect("create temp dir");
    let archive = root.path().join("upload.zip");
    let target = root.path().join("unzipped");

    write_zip(
        &archive,
        &[Entry::File("dir/a.txt", b"1"), Entry::File("dir/./a.txt", b"2")],
    );

    let err = extract(&archive, &target, &ExtractLimits::default())
        .expect_err("duplicate should be rejected");

    assert!(matches!(err, ArchiveError::MalformedArchive(_)));
    assert!(!target.exists());
}

#[test]
fn test_garbage_payload_is_malformed() {
    let root = tempdir().expect("create temp dir");
    let archive = root.path().join("upload.zip");
    fs::write(&archive, b"definitely not a zip archive").expect("write garbage");

    let err = extract(&archive, &root.path().join("unzipped"), &ExtractLimits::default())
        .expect_err("garbage should be rejected");

    assert!(matches!(err, ArchiveError::MalformedArchive(_)));
}

#[test]
fn test_missing_archive_is_not_found() {
    let root = tempdir().expect("create temp dir");

    let err = extract(
        &root.path().join("upload.zip"),
        &root.path().join("unzipped"),
        &ExtractLimits::default(),
    )
    .expect_err("missing archive should fail");

    assert!(matches!(err, ArchiveError::NotFound(_)));
}
