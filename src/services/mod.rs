//! Services for Pinacoteca
//!
//! Business logic that spans the catalog database and the artifact library.

pub mod backup;
pub mod folder_mirror;
pub mod integrity;
pub mod painting_details;
pub mod photo_import;
pub mod provisioning;

pub use backup::{BackupInfo, BackupResult, BackupService};
pub use folder_mirror::{FolderEntry, FolderIssue, FolderKind, FolderMirror};
pub use integrity::{IntegrityIssue, IntegrityReport, IntegrityService};
pub use painting_details::{DetailService, PaintingDetails};
pub use photo_import::PhotoImportService;
pub use provisioning::{CatalogService, Created, FolderOutcome, PaintingLinks};
