use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::query::{QueryBuilder, UpdateBuilder};
use super::{lock, SharedConnection};
use crate::models::{NewSeries, Series, SeriesFilter, SeriesUpdate};
use crate::utils::{CatalogError, CatalogResult};

const SERIES_SELECT: &str = "SELECT s.id, s.name, s.description, s.start_period, s.end_period,
            COUNT(ps.painting_id) AS painting_count, s.created_at, s.updated_at
     FROM series s
     LEFT JOIN painting_series ps ON ps.series_id = s.id";

pub struct SeriesRepository {
    conn: SharedConnection,
}

impl SeriesRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// All series with their painting counts, ordered by name
    pub fn list(&self) -> CatalogResult<Vec<Series>> {
        self.search(&SeriesFilter::default())
    }

    pub fn search(&self, filter: &SeriesFilter) -> CatalogResult<Vec<Series>> {
        let mut query = QueryBuilder::new(SERIES_SELECT);
        query
            .contains("s.name", filter.name.as_deref())
            .contains("s.description", filter.description.as_deref())
            .at_least("s.start_period", filter.start_from.clone())
            .at_most("s.end_period", filter.end_until.clone())
            .group_by("s.id")
            .order_by("s.name COLLATE NOCASE, s.id");

        let conn = lock(&self.conn)?;
        Ok(query.fetch(&conn, Self::row_to_series)?)
    }

    pub fn get(&self, id: i64) -> CatalogResult<Option<Series>> {
        let conn = lock(&self.conn)?;
        let series = conn
            .query_row(
                &format!("{} WHERE s.id = ? GROUP BY s.id", SERIES_SELECT),
                [id],
                Self::row_to_series,
            )
            .optional()?;
        Ok(series)
    }

    /// Series a painting belongs to
    pub fn find_by_painting(&self, painting_id: i64) -> CatalogResult<Vec<Series>> {
        let mut query = QueryBuilder::new(SERIES_SELECT);
        query
            .clause(
                "s.id IN (SELECT series_id FROM painting_series WHERE painting_id = ?)",
                painting_id,
            )
            .group_by("s.id")
            .order_by("s.name COLLATE NOCASE, s.id");

        let conn = lock(&self.conn)?;
        Ok(query.fetch(&conn, Self::row_to_series)?)
    }

    pub fn add(&self, series: &NewSeries) -> CatalogResult<i64> {
        series.validate()?;

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO series (name, description, start_period, end_period)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                series.name,
                series.description,
                series.start_period,
                series.end_period,
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!("Added series {} ({})", id, series.name);
        Ok(id)
    }

    pub fn update(&self, id: i64, changes: &SeriesUpdate) -> CatalogResult<bool> {
        if let Some(name) = &changes.name {
            NewSeries::new(name.clone()).validate()?;
        }

        let mut update = UpdateBuilder::new("series");
        update
            .set("name", changes.name.clone())
            .set("description", changes.description.clone())
            .set("start_period", changes.start_period.clone())
            .set("end_period", changes.end_period.clone());

        let conn = lock(&self.conn)?;
        if update.is_empty() {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM series WHERE id = ?)",
                [id],
                |row| row.get(0),
            )?;
            return Ok(exists);
        }

        Ok(update.execute(&conn, id)? > 0)
    }

    /// Delete a series that has no paintings.
    ///
    /// Fails with [`CatalogError::InUse`] carrying the number of associated paintings.
    pub fn delete(&self, id: i64) -> CatalogResult<bool> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM painting_series WHERE series_id = ?",
            [id],
            |row| row.get(0),
        )?;

        if count > 0 {
            return Err(CatalogError::InUse {
                entity: "series",
                id,
                count,
            });
        }

        let rows = tx.execute("DELETE FROM series WHERE id = ?", [id])?;
        tx.commit()?;

        if rows > 0 {
            info!("Deleted series {}", id);
        }
        Ok(rows > 0)
    }

    fn row_to_series(row: &Row) -> rusqlite::Result<Series> {
        Ok(Series {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            start_period: row.get(3)?,
            end_period: row.get(4)?,
            painting_count: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}
