//! Creating catalog entries together with their folders
//!
//! Creation runs in two phases. The record and its links are written in one
//! transaction; the folder is provisioned afterwards. A folder failure does
//! not undo the record and comes back as [`FolderOutcome::Failed`].

use std::path::PathBuf;
use tracing::{info, warn};

use crate::db::{AssociationRepository, Database, ExhibitionRepository, JoinTable, PaintingRepository, PriceRepository};
use crate::models::{NewExhibition, NewPainting, NewPrice};
use crate::services::folder_mirror::FolderMirror;
use crate::utils::date::today;
use crate::utils::CatalogResult;

/// Optional links written together with a new painting
#[derive(Debug, Clone, Default)]
pub struct PaintingLinks {
    pub series_id: Option<i64>,
    pub exhibition_id: Option<i64>,
    /// Recorded as the active price, dated today
    pub initial_price: Option<f64>,
}

/// What happened to the folder of a newly created record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOutcome {
    Provisioned(PathBuf),
    /// Folder creation is turned off in the settings
    Skipped,
    Failed(String),
}

impl FolderOutcome {
    pub fn is_warning(&self) -> bool {
        matches!(self, FolderOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub id: i64,
    pub folder: FolderOutcome,
}

pub struct CatalogService<'a> {
    db: &'a Database,
    folders: &'a FolderMirror,
    auto_create_folders: bool,
}

impl<'a> CatalogService<'a> {
    pub fn new(db: &'a Database, folders: &'a FolderMirror, auto_create_folders: bool) -> Self {
        Self {
            db,
            folders,
            auto_create_folders,
        }
    }

    /// Insert a painting with its links, then provision its folder
    pub fn create_painting(&self, painting: &NewPainting, links: &PaintingLinks) -> CatalogResult<Created> {
        painting.validate()?;
        let initial_price = links
            .initial_price
            .map(|amount| NewPrice::new(0, amount, today()));
        if let Some(price) = &initial_price {
            price.validate()?;
        }

        let id = self.db.with_connection(|conn| {
            let tx = conn.transaction()?;

            let id = PaintingRepository::insert(&tx, painting)?;
            if let Some(series_id) = links.series_id {
                AssociationRepository::insert(&tx, JoinTable::Series, id, series_id)?;
            }
            if let Some(exhibition_id) = links.exhibition_id {
                AssociationRepository::insert(&tx, JoinTable::Exhibitions, id, exhibition_id)?;
            }
            if let Some(mut price) = initial_price {
                price.painting_id = id;
                PriceRepository::insert(&tx, &price)?;
            }

            tx.commit()?;
            Ok(id)
        })?;

        info!("Created painting {} ({})", id, painting.title);

        Ok(Created {
            id,
            folder: self.provision_painting_folder(id, &painting.title),
        })
    }

    /// Insert an exhibition, then provision its folder
    pub fn create_exhibition(&self, exhibition: &NewExhibition) -> CatalogResult<Created> {
        exhibition.validate()?;

        let id = self.db.with_connection(|conn| {
            let tx = conn.transaction()?;
            let id = ExhibitionRepository::insert(&tx, exhibition)?;
            tx.commit()?;
            Ok(id)
        })?;

        info!("Created exhibition {} ({})", id, exhibition.name);

        Ok(Created {
            id,
            folder: self.provision_exhibition_folder(id, &exhibition.name),
        })
    }

    /// Second phase for paintings. Callers may retry after a failure.
    pub fn provision_painting_folder(&self, id: i64, title: &str) -> FolderOutcome {
        if !self.auto_create_folders {
            return FolderOutcome::Skipped;
        }
        Self::outcome("painting", id, self.folders.create_for_painting(id, title))
    }

    pub fn provision_exhibition_folder(&self, id: i64, name: &str) -> FolderOutcome {
        if !self.auto_create_folders {
            return FolderOutcome::Skipped;
        }
        Self::outcome("exhibition", id, self.folders.create_for_exhibition(id, name))
    }

    fn outcome(entity: &str, id: i64, result: anyhow::Result<PathBuf>) -> FolderOutcome {
        match result {
            Ok(path) => FolderOutcome::Provisioned(path),
            Err(e) => {
                warn!("Could not create folder for {} {}: {:#}", entity, id, e);
                FolderOutcome::Failed(format!("{:#}", e))
            }
        }
    }
}
