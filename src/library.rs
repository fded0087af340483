//! The opened catalog: settings, database and folder mirror together

use anyhow::{Context, Result};
use tracing::info;

use crate::db::Database;
use crate::models::Settings;
use crate::services::{
    BackupService, CatalogService, DetailService, FolderMirror, IntegrityService,
    PhotoImportService,
};
use crate::utils::path::display_path;

pub struct Library {
    settings: Settings,
    db: Database,
    folders: FolderMirror,
}

impl Library {
    /// Open the database (running migrations) and the folder mirror named in `settings`
    pub fn open(settings: Settings) -> Result<Self> {
        info!("Opening database: {}", display_path(&settings.database_path));
        let db = Database::open(&settings.database_path)
            .with_context(|| format!("Could not open database {:?}", settings.database_path))?;
        db.migrate().context("Migration failed")?;

        Self::with_database(settings, db)
    }

    /// Use an already opened database
    pub fn with_database(settings: Settings, db: Database) -> Result<Self> {
        let folders = FolderMirror::new(&settings.library_path)?;
        info!("Library: {}", display_path(folders.root()));

        Ok(Self {
            settings,
            db,
            folders,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn folders(&self) -> &FolderMirror {
        &self.folders
    }

    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(&self.db, &self.folders, self.settings.auto_create_folders)
    }

    pub fn details(&self) -> DetailService<'_> {
        DetailService::new(&self.db, &self.folders, self.settings.auto_create_folders)
    }

    pub fn photos(&self) -> PhotoImportService<'_> {
        PhotoImportService::new(&self.db, &self.folders)
    }

    pub fn integrity(&self) -> IntegrityService<'_> {
        IntegrityService::new(&self.db, &self.folders)
    }

    pub fn backups(&self) -> BackupService<'_> {
        BackupService::new(
            &self.db,
            &self.settings.library_path,
            &self.settings.backup_directory,
        )
    }
}
