//! Folder mirror for paintings and exhibitions
//!
//! Every painting and exhibition can own one directory under the library,
//! named `<id zero-padded to 4>_<sanitized title>`. Lookup is always by the
//! id prefix, so renaming a painting never orphans the files in its folder.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::utils::file_ops;
use crate::utils::path::sanitize_folder_name;

pub const PAINTINGS_DIR: &str = "paintings";
pub const EXHIBITIONS_DIR: &str = "exhibitions";
pub const PHOTOS_DIR: &str = "photos";

/// Subfolders created inside every exhibition folder
pub const EXHIBITION_SUBDIRS: [&str; 4] = [
    "catalog",
    "installation_photos",
    "documentation",
    "exhibited_works",
];

/// Which mirrored subtree a folder belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderKind {
    Painting,
    Exhibition,
}

impl FolderKind {
    fn dir_name(self) -> &'static str {
        match self {
            FolderKind::Painting => PAINTINGS_DIR,
            FolderKind::Exhibition => EXHIBITIONS_DIR,
        }
    }
}

/// An existing mirrored directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub id: i64,
    pub name: String,
    pub path: PathBuf,
}

/// Problems found while scanning the mirrored subtrees
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderIssue {
    /// Directory name has no numeric id prefix
    Unparseable { kind: FolderKind, path: PathBuf },
    /// Several directories claim the same id
    Duplicate {
        kind: FolderKind,
        id: i64,
        paths: Vec<PathBuf>,
    },
}

/// Filesystem mirror rooted at the library directory
#[derive(Debug, Clone)]
pub struct FolderMirror {
    root: PathBuf,
}

impl FolderMirror {
    /// Create the mirror and make sure both subtrees exist
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let mirror = Self { root: root.into() };
        mirror.ensure_root()?;
        Ok(mirror)
    }

    /// Create `paintings/` and `exhibitions/` under the root (idempotent)
    pub fn ensure_root(&self) -> Result<()> {
        for kind in [FolderKind::Painting, FolderKind::Exhibition] {
            let dir = self.subtree(kind);
            file_ops::ensure_directory(&dir)
                .with_context(|| format!("Could not create folder {:?}", dir))?;
        }
        debug!("Folder mirror ready at {:?}", self.root);
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn subtree(&self, kind: FolderKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// `0042_Still_Life`
    pub fn folder_name(id: i64, title: &str) -> String {
        format!("{:04}_{}", id, sanitize_folder_name(title))
    }

    /// Create (or reuse) the painting folder with its `photos/` subfolder
    pub fn create_for_painting(&self, id: i64, title: &str) -> Result<PathBuf> {
        let folder = self.create_folder(FolderKind::Painting, id, title)?;
        file_ops::ensure_directory(&folder.join(PHOTOS_DIR))?;
        Ok(folder)
    }

    /// Create (or reuse) the exhibition folder with its organizational subfolders
    pub fn create_for_exhibition(&self, id: i64, name: &str) -> Result<PathBuf> {
        let folder = self.create_folder(FolderKind::Exhibition, id, name)?;
        for sub in EXHIBITION_SUBDIRS {
            file_ops::ensure_directory(&folder.join(sub))?;
        }
        Ok(folder)
    }

    /// Find the painting folder by id; create it when missing and a title is given
    pub fn resolve_for_painting(&self, id: i64, title: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(existing) = self.find(FolderKind::Painting, id)? {
            return Ok(Some(existing));
        }
        match title {
            Some(title) => self.create_for_painting(id, title).map(Some),
            None => Ok(None),
        }
    }

    /// Find the exhibition folder by id; create it when missing and a name is given
    pub fn resolve_for_exhibition(&self, id: i64, name: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(existing) = self.find(FolderKind::Exhibition, id)? {
            return Ok(Some(existing));
        }
        match name {
            Some(name) => self.create_for_exhibition(id, name).map(Some),
            None => Ok(None),
        }
    }

    pub fn list_painting_folders(&self) -> Result<Vec<FolderEntry>> {
        self.list(FolderKind::Painting)
    }

    pub fn list_exhibition_folders(&self) -> Result<Vec<FolderEntry>> {
        self.list(FolderKind::Exhibition)
    }

    /// Move `file` into `folder/subfolder`, renaming on collision. Returns the new path.
    pub fn move_into(&self, file: &Path, folder: &Path, subfolder: &str) -> Result<PathBuf> {
        let target_dir = folder.join(subfolder);
        file_ops::ensure_directory(&target_dir)?;

        let filename = file
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Not a file path: {:?}", file))?;
        let target = target_dir.join(file_ops::unique_filename(&target_dir, filename));

        file_ops::move_file(file, &target)?;
        info!("Moved {:?} to {:?}", file, target);
        Ok(target)
    }

    /// Scan both subtrees for unparseable and duplicated folder names
    pub fn check(&self) -> Result<Vec<FolderIssue>> {
        let mut issues = Vec::new();

        for kind in [FolderKind::Painting, FolderKind::Exhibition] {
            let mut by_id: BTreeMap<i64, Vec<PathBuf>> = BTreeMap::new();

            for path in self.directories(kind)? {
                match Self::parse_id(&path) {
                    Some(id) => by_id.entry(id).or_default().push(path),
                    None => issues.push(FolderIssue::Unparseable { kind, path }),
                }
            }

            for (id, paths) in by_id {
                if paths.len() > 1 {
                    issues.push(FolderIssue::Duplicate { kind, id, paths });
                }
            }
        }

        Ok(issues)
    }

    fn create_folder(&self, kind: FolderKind, id: i64, title: &str) -> Result<PathBuf> {
        if let Some(existing) = self.find(kind, id)? {
            return Ok(existing);
        }

        let folder = self.subtree(kind).join(Self::folder_name(id, title));
        file_ops::ensure_directory(&folder)
            .with_context(|| format!("Could not create folder {:?}", folder))?;

        info!("Created folder {:?}", folder);
        Ok(folder)
    }

    /// First directory (by name) with the id prefix
    fn find(&self, kind: FolderKind, id: i64) -> Result<Option<PathBuf>> {
        let mut matches: Vec<PathBuf> = self
            .directories(kind)?
            .into_iter()
            .filter(|path| Self::parse_id(path) == Some(id))
            .collect();

        if matches.len() > 1 {
            warn!(
                "{} folders share id {} under {:?}, using the first",
                matches.len(),
                id,
                self.subtree(kind)
            );
        }

        // directories() is sorted, so this is the lexicographically first match
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.remove(0))
        })
    }

    fn list(&self, kind: FolderKind) -> Result<Vec<FolderEntry>> {
        let mut entries = Vec::new();

        for path in self.directories(kind)? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            match Self::parse_id(&path) {
                Some(id) => entries.push(FolderEntry { id, name, path }),
                None => warn!("Skipping folder without id prefix: {:?}", path),
            }
        }

        entries.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.name.cmp(&b.name)));
        Ok(entries)
    }

    /// Directories directly under a subtree, sorted by name
    fn directories(&self, kind: FolderKind) -> Result<Vec<PathBuf>> {
        let dir = self.subtree(kind);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("Could not read {:?}", dir))? {
            let path = entry?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Leading integer before the first `_`
    fn parse_id(path: &Path) -> Option<i64> {
        let name = path.file_name()?.to_str()?;
        let (prefix, _) = name.split_once('_')?;
        if !prefix.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let id: i64 = prefix.parse().ok()?;
        // only the exact zero-padded form written by folder_name()
        (format!("{:04}", id) == prefix).then_some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FolderMirror) {
        let temp = TempDir::new().unwrap();
        let mirror = FolderMirror::new(temp.path().join("library")).unwrap();
        (temp, mirror)
    }

    #[test]
    fn test_ensure_root_creates_subtrees() {
        let (_temp, mirror) = setup();
        assert!(mirror.root().join(PAINTINGS_DIR).is_dir());
        assert!(mirror.root().join(EXHIBITIONS_DIR).is_dir());
        mirror.ensure_root().unwrap();
    }

    #[test]
    fn test_create_then_resolve_returns_same_path() {
        let (_temp, mirror) = setup();

        let created = mirror.create_for_painting(7, "Still Life").unwrap();
        assert!(created.ends_with("paintings/0007_Still_Life"));
        assert!(created.join(PHOTOS_DIR).is_dir());

        let again = mirror.create_for_painting(7, "Still Life").unwrap();
        assert_eq!(again, created);
        assert_eq!(mirror.resolve_for_painting(7, None).unwrap(), Some(created));
        assert_eq!(mirror.list_painting_folders().unwrap().len(), 1);
    }

    #[test]
    fn test_renamed_title_reuses_folder() {
        let (_temp, mirror) = setup();
        let first = mirror.create_for_painting(3, "Old Title").unwrap();
        let second = mirror.create_for_painting(3, "New Title").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_without_title_does_not_create() {
        let (_temp, mirror) = setup();
        assert_eq!(mirror.resolve_for_exhibition(12, None).unwrap(), None);

        let created = mirror.resolve_for_exhibition(12, Some("Spring Salon")).unwrap().unwrap();
        assert!(created.ends_with("exhibitions/0012_Spring_Salon"));
        for sub in EXHIBITION_SUBDIRS {
            assert!(created.join(sub).is_dir());
        }
    }

    #[test]
    fn test_illegal_characters_are_stripped() {
        let (_temp, mirror) = setup();
        let path = mirror.create_for_painting(1, "título: \"Arte\" / <teste>").unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();

        for c in ['<', '>', ':', '"', '/', '\\', '|', '?', '*', ' '] {
            assert!(!name.contains(c), "{} contains {:?}", name, c);
        }
        assert!(name.starts_with("0001_"));
    }

    #[test]
    fn test_list_sorted_by_id_and_check_reports_issues() {
        let (_temp, mirror) = setup();
        mirror.create_for_painting(10, "Ten").unwrap();
        mirror.create_for_painting(2, "Two").unwrap();
        fs::create_dir_all(mirror.subtree(FolderKind::Painting).join("0002_Copy")).unwrap();
        fs::create_dir_all(mirror.subtree(FolderKind::Painting).join("notes")).unwrap();

        let ids: Vec<_> = mirror.list_painting_folders().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 2, 10]);

        // duplicates resolve to the lexicographically first folder
        let resolved = mirror.resolve_for_painting(2, None).unwrap().unwrap();
        assert!(resolved.ends_with("0002_Copy"));

        let issues = mirror.check().unwrap();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| matches!(i, FolderIssue::Unparseable { path, .. } if path.ends_with("notes"))));
        assert!(issues
            .iter()
            .any(|i| matches!(i, FolderIssue::Duplicate { id: 2, paths, .. } if paths.len() == 2)));
    }

    #[test]
    fn test_only_exact_id_prefixes_parse() {
        assert_eq!(FolderMirror::parse_id(Path::new("0007_Still_Life")), Some(7));
        assert_eq!(FolderMirror::parse_id(Path::new("0007_")), Some(7));
        assert_eq!(FolderMirror::parse_id(Path::new("12345_Large")), Some(12345));
        assert_eq!(FolderMirror::parse_id(Path::new("0007")), None);
        assert_eq!(FolderMirror::parse_id(Path::new("00007_x")), None);
        assert_eq!(FolderMirror::parse_id(Path::new("7_x")), None);
        assert_eq!(FolderMirror::parse_id(Path::new("+007_x")), None);

        let (_temp, mirror) = setup();
        let created = mirror.create_for_painting(7, "Seven").unwrap();
        fs::create_dir_all(mirror.subtree(FolderKind::Painting).join("00007_Padded")).unwrap();
        fs::create_dir_all(mirror.subtree(FolderKind::Painting).join("0007")).unwrap();

        assert_eq!(mirror.resolve_for_painting(7, None).unwrap(), Some(created));
        let ids: Vec<_> = mirror.list_painting_folders().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![7]);
        assert_eq!(mirror.check().unwrap().len(), 2);
    }

    #[test]
    fn test_move_into_renames_on_collision() {
        let (temp, mirror) = setup();
        let folder = mirror.create_for_painting(5, "Harbour").unwrap();

        let first = temp.path().join("scan.jpg");
        fs::write(&first, b"one").unwrap();
        let moved = mirror.move_into(&first, &folder, PHOTOS_DIR).unwrap();
        assert!(moved.ends_with("photos/scan.jpg"));
        assert!(!first.exists());

        fs::write(&first, b"two").unwrap();
        let moved_again = mirror.move_into(&first, &folder, PHOTOS_DIR).unwrap();
        assert!(moved_again.ends_with("photos/scan_1.jpg"));
        assert_eq!(fs::read(&moved).unwrap(), b"one");
    }
}
