//! Importing photographs into a painting's folder

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::db::Database;
use crate::models::{NewPhoto, Photo};
use crate::services::folder_mirror::{FolderMirror, PHOTOS_DIR};
use crate::utils::{file_ops, CatalogError};
use crate::utils::path::is_image_file;

pub struct PhotoImportService<'a> {
    db: &'a Database,
    folders: &'a FolderMirror,
}

impl<'a> PhotoImportService<'a> {
    pub fn new(db: &'a Database, folders: &'a FolderMirror) -> Self {
        Self { db, folders }
    }

    /// Copy `source` into the painting's `photos/` folder and record it.
    ///
    /// The folder is created from the painting title when it does not exist yet.
    /// An existing file with the same name is kept; the copy gets a `_1`, `_2`, ... suffix.
    pub fn import(&self, painting_id: i64, source: &Path, description: Option<&str>) -> Result<Photo> {
        if !is_image_file(source) {
            bail!("Not an image file: {:?}", source);
        }
        if !source.is_file() {
            bail!("File not found: {:?}", source);
        }

        let painting = self
            .db
            .paintings()
            .get(painting_id)?
            .ok_or_else(|| CatalogError::not_found("painting", painting_id))?;

        let folder = self
            .folders
            .resolve_for_painting(painting_id, Some(&painting.title))?
            .with_context(|| format!("No folder for painting {}", painting_id))?;
        let photos_dir = folder.join(PHOTOS_DIR);

        let filename = source
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid file name: {:?}", source))?;
        let target_name = file_ops::unique_filename(&photos_dir, filename);
        let stored = file_ops::copy_file_to_directory(source, &photos_dir, &target_name)?;

        let mut photo = NewPhoto::new(painting_id, &stored);
        photo.description = description.map(str::to_string);
        let id = match self.db.photos().add(&photo) {
            Ok(id) => id,
            Err(e) => {
                // no record points at the copy, so it must not linger
                match fs::remove_file(&stored) {
                    Ok(()) => warn!("Removed {:?} after failed photo insert", stored),
                    Err(rm) => warn!("Could not remove unrecorded photo {:?}: {}", stored, rm),
                }
                return Err(e.into());
            }
        };

        info!("Imported photo {:?} for painting {}", stored, painting_id);

        self.db
            .photos()
            .get(id)?
            .with_context(|| format!("Photo {} vanished after insert", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPainting;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Database, FolderMirror) {
        let temp = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let folders = FolderMirror::new(temp.path().join("library")).unwrap();
        (temp, db, folders)
    }

    #[test]
    fn test_import_copies_and_records() {
        let (temp, db, folders) = setup();
        let painting = db.paintings().add(&NewPainting::new("Garden")).unwrap();
        let source = temp.path().join("front.jpg");
        fs::write(&source, b"jpeg").unwrap();

        let service = PhotoImportService::new(&db, &folders);
        let photo = service.import(painting, &source, Some("Front view")).unwrap();

        assert!(photo.path.ends_with("paintings/0001_Garden/photos/front.jpg"));
        assert!(photo.path.exists());
        assert!(source.exists());
        assert_eq!(photo.description.as_deref(), Some("Front view"));

        let again = service.import(painting, &source, None).unwrap();
        assert!(again.path.ends_with("photos/front_1.jpg"));
        assert_eq!(db.photos().list_for_painting(painting).unwrap().len(), 2);
    }

    #[test]
    fn test_failed_insert_removes_copied_file() {
        let (temp, db, folders) = setup();
        let painting = db.paintings().add(&NewPainting::new("Harbour")).unwrap();
        let source = temp.path().join("front.jpg");
        fs::write(&source, b"jpeg").unwrap();

        db.with_connection(|conn| {
            conn.execute_batch("DROP TABLE photos")?;
            Ok(())
        })
        .unwrap();

        let service = PhotoImportService::new(&db, &folders);
        assert!(service.import(painting, &source, None).is_err());

        let photos_dir = folders
            .resolve_for_painting(painting, None)
            .unwrap()
            .unwrap()
            .join(PHOTOS_DIR);
        assert!(!photos_dir.join("front.jpg").exists());
        assert!(source.exists());
    }

    #[test]
    fn test_rejects_non_images_and_unknown_paintings() {
        let (temp, db, folders) = setup();
        let painting = db.paintings().add(&NewPainting::new("Notes")).unwrap();
        let text = temp.path().join("notes.txt");
        fs::write(&text, b"text").unwrap();
        let image = temp.path().join("scan.png");
        fs::write(&image, b"png").unwrap();

        let service = PhotoImportService::new(&db, &folders);
        assert!(service.import(painting, &text, None).is_err());
        assert!(service.import(painting + 1, &image, None).is_err());
        assert!(db.photos().list_for_painting(painting).unwrap().is_empty());
    }
}
