//! Read-only composite view of one painting

use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;
use tracing::warn;

use crate::db::Database;
use crate::models::{Exhibition, LocationRecord, Painting, Photo, Price, PriceStatistics, Series};
use crate::services::folder_mirror::FolderMirror;
use crate::utils::CatalogResult;

/// Everything known about a painting.
///
/// Sections whose query failed are left empty and described in `warnings`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaintingDetails {
    pub painting: Painting,
    pub photos: Vec<Photo>,
    pub exhibitions: Vec<Exhibition>,
    pub series: Vec<Series>,
    pub locations: Vec<LocationRecord>,
    pub prices: Vec<Price>,
    pub current_price: Option<Price>,
    pub current_location: Option<LocationRecord>,
    pub price_statistics: PriceStatistics,
    pub photo_folder: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl PaintingDetails {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub struct DetailService<'a> {
    db: &'a Database,
    folders: &'a FolderMirror,
    auto_create_folders: bool,
}

impl<'a> DetailService<'a> {
    pub fn new(db: &'a Database, folders: &'a FolderMirror, auto_create_folders: bool) -> Self {
        Self {
            db,
            folders,
            auto_create_folders,
        }
    }

    /// Assemble the details of a painting. `Ok(None)` when it does not exist.
    pub fn details(&self, painting_id: i64) -> CatalogResult<Option<PaintingDetails>> {
        let painting = match self.db.paintings().get(painting_id)? {
            Some(p) => p,
            None => return Ok(None),
        };

        let mut warnings = Vec::new();

        let photos = section(&mut warnings, "photos", self.db.photos().list_for_painting(painting_id));
        let exhibitions = section(
            &mut warnings,
            "exhibitions",
            self.db.exhibitions().find_by_painting(painting_id),
        );
        let series = section(&mut warnings, "series", self.db.series().find_by_painting(painting_id));
        let locations = section(
            &mut warnings,
            "locations",
            self.db.locations().list_for_painting(painting_id),
        );
        let prices = section(&mut warnings, "prices", self.db.prices().list_for_painting(painting_id));
        let current_price = section(&mut warnings, "current price", self.db.prices().current(painting_id));
        let current_location = section(
            &mut warnings,
            "current location",
            self.db.locations().current(painting_id),
        );
        let price_statistics = section(
            &mut warnings,
            "price statistics",
            self.db.prices().statistics(painting_id),
        );

        let title = self.auto_create_folders.then_some(painting.title.as_str());
        let photo_folder = section(
            &mut warnings,
            "photo folder",
            self.folders.resolve_for_painting(painting_id, title),
        );

        Ok(Some(PaintingDetails {
            painting,
            photos,
            exhibitions,
            series,
            locations,
            prices,
            current_price,
            current_location,
            price_statistics,
            photo_folder,
            warnings,
        }))
    }
}

/// Unwrap one section, or log the error and fall back to an empty value
fn section<T: Default, E: Display>(warnings: &mut Vec<String>, name: &str, result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not load {}: {}", name, e);
            warnings.push(format!("{}: {}", name, e));
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewExhibition, NewLocation, NewPainting, NewPrice};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_details_collects_all_sections() {
        let temp = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let folders = FolderMirror::new(temp.path().join("library")).unwrap();

        let painting = db.paintings().add(&NewPainting::new("Still Life").with_technique("Oil")).unwrap();
        let expo = db.exhibitions().add(&NewExhibition::new("Salon")).unwrap();
        db.exhibition_links().associate(painting, expo).unwrap();
        db.prices().add(&NewPrice::new(painting, 500.0, date(2024, 1, 1))).unwrap();
        db.prices().set_current(painting, 600.0, date(2024, 6, 1), None).unwrap();
        db.locations()
            .add(&NewLocation::new(painting, "Studio", date(2023, 1, 1)))
            .unwrap();

        let details = DetailService::new(&db, &folders, true)
            .details(painting)
            .unwrap()
            .unwrap();

        assert!(details.is_complete());
        assert_eq!(details.painting.technique.as_deref(), Some("Oil"));
        assert_eq!(details.exhibitions.len(), 1);
        assert_eq!(details.prices.len(), 2);
        assert_eq!(details.current_price.as_ref().map(|p| p.amount), Some(600.0));
        assert_eq!(details.current_location.as_ref().map(|l| l.venue.as_str()), Some("Studio"));
        assert_eq!(details.price_statistics.count, 2);
        assert!(details.photo_folder.unwrap().ends_with("0001_Still_Life"));
    }

    #[test]
    fn test_missing_painting_and_no_folder_creation() {
        let temp = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let folders = FolderMirror::new(temp.path().join("library")).unwrap();
        let service = DetailService::new(&db, &folders, false);

        assert!(service.details(42).unwrap().is_none());

        let painting = db.paintings().add(&NewPainting::new("Bare")).unwrap();
        let details = service.details(painting).unwrap().unwrap();
        assert!(details.photo_folder.is_none());
        assert!(folders.list_painting_folders().unwrap().is_empty());
    }

    #[test]
    fn test_folder_error_is_a_warning() {
        let temp = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let folders = FolderMirror::new(temp.path().join("library")).unwrap();
        let subtree = folders.root().join("paintings");
        fs::remove_dir_all(&subtree).unwrap();
        fs::write(&subtree, b"blocked").unwrap();

        let painting = db.paintings().add(&NewPainting::new("Partial")).unwrap();
        let details = DetailService::new(&db, &folders, true)
            .details(painting)
            .unwrap()
            .unwrap();

        assert_eq!(details.painting.title, "Partial");
        assert!(details.photo_folder.is_none());
        assert_eq!(details.warnings.len(), 1);
        assert!(details.warnings[0].starts_with("photo folder"));
    }
}
