//! Consistency between the catalog and the folder mirror

use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::db::Database;
use crate::services::folder_mirror::{FolderEntry, FolderIssue, FolderKind, FolderMirror};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// Problem in the folder names themselves
    Folder(FolderIssue),
    /// A record without a folder
    MissingFolder { kind: FolderKind, id: i64, title: String },
    /// A folder whose id has no record
    OrphanFolder { kind: FolderKind, id: i64, path: PathBuf },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::Folder(FolderIssue::Unparseable { path, .. }) => {
                write!(f, "Folder without id prefix: {}", path.display())
            }
            IntegrityIssue::Folder(FolderIssue::Duplicate { kind, id, paths }) => {
                write!(f, "{} folders for {:?} {}", paths.len(), kind, id)
            }
            IntegrityIssue::MissingFolder { kind, id, title } => {
                write!(f, "No folder for {:?} {} ({})", kind, id, title)
            }
            IntegrityIssue::OrphanFolder { kind, id, path } => {
                write!(f, "Folder {} has no {:?} {}", path.display(), kind, id)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn summary(&self) -> String {
        let missing = self
            .issues
            .iter()
            .filter(|i| matches!(i, IntegrityIssue::MissingFolder { .. }))
            .count();
        let orphans = self
            .issues
            .iter()
            .filter(|i| matches!(i, IntegrityIssue::OrphanFolder { .. }))
            .count();
        let naming = self.issues.len() - missing - orphans;
        format!(
            "{} missing folders, {} orphan folders, {} naming problems",
            missing, orphans, naming
        )
    }
}

pub struct IntegrityService<'a> {
    db: &'a Database,
    folders: &'a FolderMirror,
}

impl<'a> IntegrityService<'a> {
    pub fn new(db: &'a Database, folders: &'a FolderMirror) -> Self {
        Self { db, folders }
    }

    pub fn check(&self) -> Result<IntegrityReport> {
        let mut report = IntegrityReport::default();

        report
            .issues
            .extend(self.folders.check()?.into_iter().map(IntegrityIssue::Folder));

        Self::compare(
            &mut report,
            FolderKind::Painting,
            self.db.paintings().titles()?,
            self.folders.list_painting_folders()?,
        );
        Self::compare(
            &mut report,
            FolderKind::Exhibition,
            self.db.exhibitions().names()?,
            self.folders.list_exhibition_folders()?,
        );

        for issue in &report.issues {
            warn!("{}", issue);
        }
        info!("Integrity check: {}", report.summary());

        Ok(report)
    }

    fn compare(
        report: &mut IntegrityReport,
        kind: FolderKind,
        records: Vec<(i64, String)>,
        folders: Vec<FolderEntry>,
    ) {
        let mut by_id: BTreeMap<i64, PathBuf> = BTreeMap::new();
        for entry in folders {
            by_id.entry(entry.id).or_insert(entry.path);
        }
        let known: BTreeSet<i64> = records.iter().map(|(id, _)| *id).collect();

        for (id, title) in records {
            if !by_id.contains_key(&id) {
                report.issues.push(IntegrityIssue::MissingFolder { kind, id, title });
            }
        }
        for (id, path) in by_id {
            if !known.contains(&id) {
                report.issues.push(IntegrityIssue::OrphanFolder { kind, id, path });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewExhibition, NewPainting};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_clean_library() {
        let temp = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let folders = FolderMirror::new(temp.path().join("library")).unwrap();

        let painting = db.paintings().add(&NewPainting::new("Lake")).unwrap();
        folders.create_for_painting(painting, "Lake").unwrap();
        let expo = db.exhibitions().add(&NewExhibition::new("Waters")).unwrap();
        folders.create_for_exhibition(expo, "Waters").unwrap();

        let report = IntegrityService::new(&db, &folders).check().unwrap();
        assert!(report.is_clean(), "{:?}", report.issues);
    }

    #[test]
    fn test_reports_missing_orphan_and_naming_issues() {
        let temp = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let folders = FolderMirror::new(temp.path().join("library")).unwrap();

        let painting = db.paintings().add(&NewPainting::new("No Folder")).unwrap();
        folders.create_for_exhibition(77, "Forgotten").unwrap();
        fs::create_dir_all(folders.root().join("paintings").join("misc")).unwrap();

        let report = IntegrityService::new(&db, &folders).check().unwrap();

        assert_eq!(report.issues.len(), 3);
        assert!(report.issues.contains(&IntegrityIssue::MissingFolder {
            kind: FolderKind::Painting,
            id: painting,
            title: "No Folder".into(),
        }));
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, IntegrityIssue::OrphanFolder { kind: FolderKind::Exhibition, id: 77, .. })));
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, IntegrityIssue::Folder(FolderIssue::Unparseable { .. }))));
        assert_eq!(report.summary(), "1 missing folders, 1 orphan folders, 1 naming problems");
    }
}
