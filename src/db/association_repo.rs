use rusqlite::{params, Connection};
use tracing::{debug, info};

use super::painting_repo::PaintingRepository;
use super::{lock, SharedConnection};
use crate::models::Painting;
use crate::utils::CatalogResult;

/// Join tables linking paintings to another entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinTable {
    Series,
    Exhibitions,
}

impl JoinTable {
    fn table(self) -> &'static str {
        match self {
            JoinTable::Series => "painting_series",
            JoinTable::Exhibitions => "painting_exhibitions",
        }
    }

    fn other_column(self) -> &'static str {
        match self {
            JoinTable::Series => "series_id",
            JoinTable::Exhibitions => "exhibition_id",
        }
    }
}

/// Painting links for one join table
pub struct AssociationRepository {
    conn: SharedConnection,
    table: JoinTable,
}

impl AssociationRepository {
    pub fn new(conn: SharedConnection, table: JoinTable) -> Self {
        Self { conn, table }
    }

    /// Link a painting. Returns `false` when the pair already exists.
    pub fn associate(&self, painting_id: i64, other_id: i64) -> CatalogResult<bool> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        if Self::pair_exists(&tx, self.table, painting_id, other_id)? {
            debug!(
                "Painting {} already linked in {} to {}",
                painting_id,
                self.table.table(),
                other_id
            );
            return Ok(false);
        }

        Self::insert(&tx, self.table, painting_id, other_id)?;
        tx.commit()?;

        info!(
            "Linked painting {} to {} {}",
            painting_id,
            self.table.other_column(),
            other_id
        );
        Ok(true)
    }

    /// Remove a link. Returns whether a row was removed.
    pub fn disassociate(&self, painting_id: i64, other_id: i64) -> CatalogResult<bool> {
        let conn = lock(&self.conn)?;
        let rows = conn.execute(
            &format!(
                "DELETE FROM {} WHERE painting_id = ? AND {} = ?",
                self.table.table(),
                self.table.other_column()
            ),
            params![painting_id, other_id],
        )?;
        Ok(rows > 0)
    }

    pub fn exists(&self, painting_id: i64, other_id: i64) -> CatalogResult<bool> {
        let conn = lock(&self.conn)?;
        Ok(Self::pair_exists(&conn, self.table, painting_id, other_id)?)
    }

    /// Number of paintings linked to `other_id`
    pub fn count(&self, other_id: i64) -> CatalogResult<i64> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ?",
                self.table.table(),
                self.table.other_column()
            ),
            [other_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Paintings linked to `other_id`, ordered by title
    pub fn paintings(&self, other_id: i64) -> CatalogResult<Vec<Painting>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT p.id, p.title, p.technique, p.size, p.creation_date, p.location,
                    p.created_at, p.updated_at
             FROM paintings p
             JOIN {} j ON j.painting_id = p.id
             WHERE j.{} = ?
             ORDER BY p.title COLLATE NOCASE, p.id",
            self.table.table(),
            self.table.other_column()
        ))?;

        let paintings = stmt
            .query_map([other_id], PaintingRepository::row_to_painting)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(paintings)
    }

    pub(crate) fn insert(
        conn: &Connection,
        table: JoinTable,
        painting_id: i64,
        other_id: i64,
    ) -> rusqlite::Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO {} (painting_id, {}) VALUES (?1, ?2)",
                table.table(),
                table.other_column()
            ),
            params![painting_id, other_id],
        )?;
        Ok(())
    }

    fn pair_exists(
        conn: &Connection,
        table: JoinTable,
        painting_id: i64,
        other_id: i64,
    ) -> rusqlite::Result<bool> {
        conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE painting_id = ? AND {} = ?)",
                table.table(),
                table.other_column()
            ),
            params![painting_id, other_id],
            |row| row.get(0),
        )
    }
}
