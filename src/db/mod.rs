pub mod association_repo;
pub mod exhibition_repo;
pub mod location_repo;
pub mod migrations;
pub mod painting_repo;
pub mod photo_repo;
pub mod price_repo;
pub mod query;
pub mod schema;
pub mod series_repo;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::utils::{CatalogError, CatalogResult};

pub use association_repo::{AssociationRepository, JoinTable};
pub use exhibition_repo::ExhibitionRepository;
pub use location_repo::LocationRepository;
pub use painting_repo::PaintingRepository;
pub use photo_repo::PhotoRepository;
pub use price_repo::PriceRepository;
pub use series_repo::SeriesRepository;

pub(crate) type SharedConnection = Arc<Mutex<Connection>>;

/// Lock the shared connection, mapping poisoning to a catalog error
pub(crate) fn lock(conn: &SharedConnection) -> CatalogResult<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| CatalogError::LockPoisoned)
}

/// Handle to the catalog database file
pub struct Database {
    conn: SharedConnection,
}

impl Database {
    /// Open or create the database
    pub fn open(path: &Path) -> CatalogResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            ",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database with the schema applied (for tests)
    pub fn open_in_memory() -> CatalogResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.migrate()?;
        Ok(db)
    }

    pub fn migrate(&self) -> CatalogResult<()> {
        let conn = lock(&self.conn)?;
        migrations::run_migrations(&conn)
    }

    pub fn paintings(&self) -> PaintingRepository {
        PaintingRepository::new(Arc::clone(&self.conn))
    }

    pub fn series(&self) -> SeriesRepository {
        SeriesRepository::new(Arc::clone(&self.conn))
    }

    pub fn exhibitions(&self) -> ExhibitionRepository {
        ExhibitionRepository::new(Arc::clone(&self.conn))
    }

    /// Painting <-> series links
    pub fn series_links(&self) -> AssociationRepository {
        AssociationRepository::new(Arc::clone(&self.conn), JoinTable::Series)
    }

    /// Painting <-> exhibition links
    pub fn exhibition_links(&self) -> AssociationRepository {
        AssociationRepository::new(Arc::clone(&self.conn), JoinTable::Exhibitions)
    }

    pub fn photos(&self) -> PhotoRepository {
        PhotoRepository::new(Arc::clone(&self.conn))
    }

    pub fn prices(&self) -> PriceRepository {
        PriceRepository::new(Arc::clone(&self.conn))
    }

    pub fn locations(&self) -> LocationRepository {
        LocationRepository::new(Arc::clone(&self.conn))
    }

    /// Write a consistent copy of the database to `dest` (`VACUUM INTO`)
    pub fn snapshot_to(&self, dest: &Path) -> CatalogResult<()> {
        if dest.exists() {
            std::fs::remove_file(dest)?;
        }
        let conn = lock(&self.conn)?;
        conn.execute("VACUUM INTO ?1", [dest.to_string_lossy().to_string()])?;
        Ok(())
    }

    /// Direct access to the connection for multi-repository transactions
    pub fn with_connection<F, T>(&self, f: F) -> CatalogResult<T>
    where
        F: FnOnce(&mut Connection) -> CatalogResult<T>,
    {
        let mut conn = lock(&self.conn)?;
        f(&mut conn)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}
