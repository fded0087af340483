use thiserror::Error;

/// Error type shared by every catalog repository.
///
/// Absence of a record is not an error: point lookups return `Ok(None)`.
/// A delete blocked by existing associations is reported as [`CatalogError::InUse`]
/// together with the number of blocking paintings.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Cannot delete {entity} {id}: {count} painting(s) still associated")]
    InUse {
        entity: &'static str,
        id: i64,
        count: i64,
    },

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

impl CatalogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Number of associations blocking a delete, if this is such an error
    pub fn blocking_count(&self) -> Option<i64> {
        match self {
            Self::InUse { count, .. } => Some(*count),
            _ => None,
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
