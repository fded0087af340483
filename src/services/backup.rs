//! Backups of the catalog database and the artifact library

use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::db::Database;
use crate::utils::file_ops;

const BACKUP_PREFIX: &str = "pinacoteca_backup_";
const SNAPSHOT_NAME: &str = ".pinacoteca_snapshot.db";

/// Result of a backup
#[derive(Debug, Clone)]
pub struct BackupResult {
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Files in the archive, the database included
    pub file_count: usize,
    pub created_at: String,
}

impl BackupResult {
    pub fn size_display(&self) -> String {
        size_display(self.size)
    }
}

/// An existing backup archive
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub filename: String,
    pub size: u64,
    /// Taken from the file name
    pub date: Option<String>,
}

impl BackupInfo {
    pub fn size_display(&self) -> String {
        size_display(self.size)
    }
}

fn size_display(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match size {
        b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}

pub struct BackupService<'a> {
    db: &'a Database,
    library: &'a Path,
    backup_dir: &'a Path,
}

impl<'a> BackupService<'a> {
    pub fn new(db: &'a Database, library: &'a Path, backup_dir: &'a Path) -> Self {
        Self {
            db,
            library,
            backup_dir,
        }
    }

    /// Zip a database snapshot and the library into the backup directory
    pub fn create_backup(&self) -> Result<BackupResult> {
        fs::create_dir_all(self.backup_dir).context("Could not create backup directory")?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        // several backups within one second get _1, _2, ... suffixes
        let filename = file_ops::unique_filename(
            self.backup_dir,
            &format!("{}{}.zip", BACKUP_PREFIX, timestamp),
        );
        let backup_path = self.backup_dir.join(&filename);

        let snapshot = self.backup_dir.join(SNAPSHOT_NAME);
        self.db
            .snapshot_to(&snapshot)
            .context("Could not snapshot the database")?;

        let result = self.write_archive(&backup_path, &snapshot);
        if let Err(e) = fs::remove_file(&snapshot) {
            warn!("Could not remove database snapshot {:?}: {}", snapshot, e);
        }
        let file_count = result?;

        let metadata = fs::metadata(&backup_path)?;
        info!("Backup written to {:?} ({} files)", backup_path, file_count);

        Ok(BackupResult {
            path: backup_path,
            size: metadata.len(),
            file_count,
            created_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    /// Existing backups, newest first
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(self.backup_dir)? {
            let path = entry?.path();

            if path.extension().map(|e| e == "zip").unwrap_or(false) {
                let filename = path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();

                let metadata = fs::metadata(&path)?;
                let date = Self::extract_date_from_filename(&filename);

                backups.push(BackupInfo {
                    path,
                    filename,
                    size: metadata.len(),
                    date,
                });
            }
        }

        backups.sort_by(|a, b| b.filename.cmp(&a.filename));

        Ok(backups)
    }

    fn write_archive(&self, backup_path: &Path, snapshot: &Path) -> Result<usize> {
        let file = File::options()
            .write(true)
            .create_new(true)
            .open(backup_path)
            .context("Could not create backup file")?;
        let mut zip = ZipWriter::new(file);

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(6));

        add_file_to_zip(&mut zip, snapshot, "pinacoteca.db", options)?;
        let mut file_count = 1;

        if self.library.exists() {
            // a backup directory inside the library holds the archive being written
            file_count += add_directory_to_zip(
                &mut zip,
                self.library,
                "library",
                Some(self.backup_dir),
                options,
            )?;
        }

        zip.finish().context("Could not finish ZIP file")?;
        Ok(file_count)
    }

    fn extract_date_from_filename(filename: &str) -> Option<String> {
        // pinacoteca_backup_YYYYMMDD_HHMMSS.zip
        let date_part = filename.strip_prefix(BACKUP_PREFIX)?.strip_suffix(".zip")?;
        if date_part.len() < 15 || !date_part.is_char_boundary(15) {
            return None;
        }
        let parsed =
            chrono::NaiveDateTime::parse_from_str(&date_part[..15], "%Y%m%d_%H%M%S").ok()?;
        Some(parsed.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

fn add_file_to_zip<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    file_path: &Path,
    archive_name: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(archive_name, options)?;

    let mut file = File::open(file_path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    zip.write_all(&buffer)?;

    Ok(())
}

fn add_directory_to_zip<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    dir_path: &Path,
    base_name: &str,
    skip: Option<&Path>,
    options: SimpleFileOptions,
) -> Result<usize> {
    let mut count = 0;

    let entries = WalkDir::new(dir_path)
        .into_iter()
        .filter_entry(|e| skip.map_or(true, |skip| e.path() != skip))
        .filter_map(|e| e.ok());

    for entry in entries {
        let path = entry.path();
        let relative = path.strip_prefix(dir_path).unwrap_or(path);
        let archive_name = format!("{}/{}", base_name, relative.to_string_lossy().replace('\\', "/"));

        if path.is_file() {
            add_file_to_zip(zip, path, &archive_name, options)?;
            count += 1;
        } else if path.is_dir() && path != dir_path {
            zip.add_directory(archive_name, options)?;
        }
    }

    Ok(count)
}
