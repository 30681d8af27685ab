//! Submission archive storage.
//!
//! Receives raw exam submission archives into a deterministic directory
//! layout, extracts them with entry count, size and path containment limits,
//! and lists the extracted files.

pub mod error;
pub mod extract;
pub mod layout;
pub mod listing;
pub mod receiver;
pub mod store;

pub use error::{ArchiveError, Result};
pub use extract::{ExtractLimits, ExtractionReport, extract};
pub use layout::{ExamStorage, StorageLayout};
pub use listing::{FileListing, list_files};
pub use receiver::write_archive;
pub use store::SubmissionStore;
