use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::query::{QueryBuilder, UpdateBuilder};
use super::{lock, SharedConnection};
use crate::models::{
    AdvancedFilter, NewPainting, Painting, PaintingFilter, PaintingSearchRow, PaintingUpdate,
};
use crate::utils::CatalogResult;

const PAINTING_COLUMNS: &str =
    "p.id, p.title, p.technique, p.size, p.creation_date, p.location, p.created_at, p.updated_at";

pub struct PaintingRepository {
    conn: SharedConnection,
}

impl PaintingRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// All paintings ordered by title
    pub fn list(&self) -> CatalogResult<Vec<Painting>> {
        self.search(&PaintingFilter::default())
    }

    pub fn get(&self, id: i64) -> CatalogResult<Option<Painting>> {
        let conn = lock(&self.conn)?;
        let painting = conn
            .query_row(
                &format!("SELECT {} FROM paintings p WHERE p.id = ?", PAINTING_COLUMNS),
                [id],
                Self::row_to_painting,
            )
            .optional()?;
        Ok(painting)
    }

    /// Substring search over the painting's own text fields
    pub fn search(&self, filter: &PaintingFilter) -> CatalogResult<Vec<Painting>> {
        let mut query = QueryBuilder::new(&format!("SELECT {} FROM paintings p", PAINTING_COLUMNS));
        Self::apply_basic_filter(&mut query, filter);
        query.order_by("p.title COLLATE NOCASE, p.id");

        let conn = lock(&self.conn)?;
        Ok(query.fetch(&conn, Self::row_to_painting)?)
    }

    /// Search joined with each painting's latest price, its series and its exhibitions
    pub fn advanced_search(&self, filter: &AdvancedFilter) -> CatalogResult<Vec<PaintingSearchRow>> {
        let mut query = QueryBuilder::new(&format!(
            "SELECT {},
                    lp.amount,
                    (SELECT GROUP_CONCAT(s.name, ', ')
                       FROM painting_series ps JOIN series s ON s.id = ps.series_id
                      WHERE ps.painting_id = p.id) AS series_names,
                    (SELECT GROUP_CONCAT(e.name, ', ')
                       FROM painting_exhibitions pe JOIN exhibitions e ON e.id = pe.exhibition_id
                      WHERE pe.painting_id = p.id) AS exhibition_names
             FROM paintings p
             LEFT JOIN (
                 SELECT painting_id, amount,
                        ROW_NUMBER() OVER (
                            PARTITION BY painting_id ORDER BY evaluation_date DESC, id DESC
                        ) AS rn
                 FROM prices
             ) lp ON lp.painting_id = p.id AND lp.rn = 1",
            PAINTING_COLUMNS
        ));

        Self::apply_basic_filter(&mut query, &filter.basic);
        query
            .at_least("lp.amount", filter.min_price)
            .at_most("lp.amount", filter.max_price)
            .clause_contains(
                "EXISTS (SELECT 1 FROM painting_series ps JOIN series s ON s.id = ps.series_id
                          WHERE ps.painting_id = p.id AND s.name LIKE ? ESCAPE '\\')",
                filter.series.as_deref(),
            )
            .clause_contains(
                "EXISTS (SELECT 1 FROM painting_exhibitions pe JOIN exhibitions e ON e.id = pe.exhibition_id
                          WHERE pe.painting_id = p.id AND e.name LIKE ? ESCAPE '\\')",
                filter.exhibition.as_deref(),
            )
            .order_by("p.title COLLATE NOCASE, p.id");

        let conn = lock(&self.conn)?;
        let rows = query.fetch(&conn, |row| {
            Ok(PaintingSearchRow {
                painting: Self::row_to_painting(row)?,
                latest_price: row.get(8)?,
                series_names: row.get(9)?,
                exhibition_names: row.get(10)?,
            })
        })?;

        debug!("Advanced search returned {} paintings", rows.len());
        Ok(rows)
    }

    /// Insert a painting and return its id
    pub fn add(&self, painting: &NewPainting) -> CatalogResult<i64> {
        painting.validate()?;

        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let id = Self::insert(&tx, painting)?;
        tx.commit()?;

        info!("Added painting {} ({})", id, painting.title);
        Ok(id)
    }

    /// Insert on an existing connection or transaction
    pub(crate) fn insert(conn: &Connection, painting: &NewPainting) -> rusqlite::Result<i64> {
        conn.execute(
            "INSERT INTO paintings (title, technique, size, creation_date, location)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                painting.title,
                painting.technique,
                painting.size,
                painting.creation_date,
                painting.location,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Apply a partial update. `Ok(false)` if the painting does not exist.
    pub fn update(&self, id: i64, changes: &PaintingUpdate) -> CatalogResult<bool> {
        if let Some(title) = &changes.title {
            NewPainting::new(title.clone()).validate()?;
        }

        let conn = lock(&self.conn)?;

        if changes.is_empty() {
            return Ok(Self::exists(&conn, id)?);
        }

        let mut update = UpdateBuilder::new("paintings");
        update
            .set("title", changes.title.clone())
            .set("technique", changes.technique.clone())
            .set("size", changes.size.clone())
            .set("creation_date", changes.creation_date.clone())
            .set("location", changes.location.clone());

        let rows = update.execute(&conn, id)?;
        Ok(rows > 0)
    }

    /// Delete a painting together with its photo references, prices,
    /// locations and associations. Files in the library are left alone.
    pub fn delete(&self, id: i64) -> CatalogResult<bool> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        for table in ["photos", "prices", "locations", "painting_series", "painting_exhibitions"] {
            tx.execute(&format!("DELETE FROM {} WHERE painting_id = ?", table), [id])?;
        }
        let rows = tx.execute("DELETE FROM paintings WHERE id = ?", [id])?;

        tx.commit()?;

        if rows > 0 {
            info!("Deleted painting {}", id);
        }
        Ok(rows > 0)
    }

    pub fn count(&self) -> CatalogResult<i64> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM paintings", [], |row| row.get(0))?;
        Ok(count)
    }

    /// All painting ids with their titles, for folder reconciliation
    pub fn titles(&self) -> CatalogResult<Vec<(i64, String)>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare("SELECT id, title FROM paintings ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub(crate) fn exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM paintings WHERE id = ?)",
            [id],
            |row| row.get(0),
        )
    }

    fn apply_basic_filter(query: &mut QueryBuilder, filter: &PaintingFilter) {
        query
            .contains("p.title", filter.title.as_deref())
            .contains("p.technique", filter.technique.as_deref())
            .contains("p.size", filter.size.as_deref())
            .contains("p.creation_date", filter.creation_date.as_deref())
            .contains("p.location", filter.location.as_deref());
    }

    /// Map the leading painting columns of a row
    pub(crate) fn row_to_painting(row: &Row) -> rusqlite::Result<Painting> {
        Ok(Painting {
            id: row.get(0)?,
            title: row.get(1)?,
            technique: row.get(2)?,
            size: row.get(3)?,
            creation_date: row.get(4)?,
            location: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}
