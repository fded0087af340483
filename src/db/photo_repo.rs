use rusqlite::{params, OptionalExtension, Row};
use std::path::PathBuf;
use tracing::info;

use super::{lock, SharedConnection};
use crate::models::{NewPhoto, Photo};
use crate::utils::CatalogResult;

pub struct PhotoRepository {
    conn: SharedConnection,
}

impl PhotoRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn add(&self, photo: &NewPhoto) -> CatalogResult<i64> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO photos (painting_id, path, description) VALUES (?1, ?2, ?3)",
            params![
                photo.painting_id,
                photo.path.to_string_lossy().to_string(),
                photo.description,
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!("Added photo {} for painting {}", id, photo.painting_id);
        Ok(id)
    }

    pub fn get(&self, id: i64) -> CatalogResult<Option<Photo>> {
        let conn = lock(&self.conn)?;
        let photo = conn
            .query_row(
                "SELECT id, painting_id, path, description, created_at FROM photos WHERE id = ?",
                [id],
                Self::row_to_photo,
            )
            .optional()?;
        Ok(photo)
    }

    /// Photos of a painting in insertion order
    pub fn list_for_painting(&self, painting_id: i64) -> CatalogResult<Vec<Photo>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT id, painting_id, path, description, created_at
             FROM photos WHERE painting_id = ? ORDER BY id",
        )?;

        let photos = stmt
            .query_map([painting_id], Self::row_to_photo)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(photos)
    }

    pub fn update_description(&self, id: i64, description: Option<&str>) -> CatalogResult<bool> {
        let conn = lock(&self.conn)?;
        let rows = conn.execute(
            "UPDATE photos SET description = ?1 WHERE id = ?2",
            params![description, id],
        )?;
        Ok(rows > 0)
    }

    /// Remove the catalog reference. The image file stays where it is.
    pub fn delete(&self, id: i64) -> CatalogResult<bool> {
        let conn = lock(&self.conn)?;
        let rows = conn.execute("DELETE FROM photos WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    fn row_to_photo(row: &Row) -> rusqlite::Result<Photo> {
        let path: String = row.get(2)?;
        Ok(Photo {
            id: row.get(0)?,
            painting_id: row.get(1)?,
            path: PathBuf::from(path),
            description: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}
