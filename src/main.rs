//! Pinacoteca - Entry Point
//!
//! Opens the catalog, takes a backup and reports folder problems.

use anyhow::Result;

use pinacoteca::models::Settings;
use pinacoteca::utils::path::display_path;
use pinacoteca::Library;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    tracing::info!("Starting Pinacoteca v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load();
    let library = Library::open(settings)?;

    if library.settings().backup_enabled {
        match library.backups().create_backup() {
            Ok(backup) => tracing::info!(
                "Backup created: {} ({})",
                display_path(&backup.path),
                backup.size_display()
            ),
            Err(e) => tracing::error!("Backup failed: {:#}", e),
        }
    }

    let report = library.integrity().check()?;
    if !report.is_clean() {
        tracing::warn!("Library has problems: {}", report.summary());
    }

    let db = library.db();
    tracing::info!(
        "{} paintings, {} exhibitions, {} series",
        db.paintings().count()?,
        db.exhibitions().count()?,
        db.series().list()?.len()
    );

    Ok(())
}
