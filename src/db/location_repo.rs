use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::painting_repo::PaintingRepository;
use super::query::QueryBuilder;
use super::{lock, SharedConnection};
use crate::models::{LocationRecord, NewLocation, PaintingAtVenue, TimeAtLocation, VenueSummary};
use crate::utils::date::{days_between, format_date};
use crate::utils::{CatalogError, CatalogResult};

const LOCATION_COLUMNS: &str = "id, painting_id, venue, entry_date, exit_date, notes, is_current";

pub struct LocationRepository {
    conn: SharedConnection,
}

impl LocationRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Record a stay. An open stay (no exit date) becomes the current location.
    pub fn add(&self, location: &NewLocation) -> CatalogResult<i64> {
        if location.venue.trim().is_empty() {
            return Err(CatalogError::validation("Venue must not be empty"));
        }

        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        if location.is_current() {
            tx.execute(
                "UPDATE locations SET is_current = 0 WHERE painting_id = ? AND is_current = 1",
                [location.painting_id],
            )?;
        }

        tx.execute(
            "INSERT INTO locations (painting_id, venue, entry_date, exit_date, notes, is_current)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                location.painting_id,
                location.venue,
                location.entry_date,
                location.exit_date,
                location.notes,
                location.is_current(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(
            "Added location {} ({}) for painting {}",
            id, location.venue, location.painting_id
        );
        Ok(id)
    }

    /// Close the current stay on `left_previous_on` and open a new one at `venue`
    pub fn move_to(
        &self,
        painting_id: i64,
        venue: &str,
        left_previous_on: NaiveDate,
        entered_on: NaiveDate,
        notes: Option<&str>,
    ) -> CatalogResult<i64> {
        if venue.trim().is_empty() {
            return Err(CatalogError::validation("Venue must not be empty"));
        }

        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        if !PaintingRepository::exists(&tx, painting_id)? {
            return Err(CatalogError::not_found("painting", painting_id));
        }

        tx.execute(
            "UPDATE locations SET exit_date = ?1, is_current = 0
             WHERE painting_id = ?2 AND is_current = 1",
            params![left_previous_on, painting_id],
        )?;

        tx.execute(
            "INSERT INTO locations (painting_id, venue, entry_date, notes, is_current)
             VALUES (?1, ?2, ?3, ?4, 1)",
            params![painting_id, venue, entered_on, notes],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(
            "Moved painting {} to {} on {}",
            painting_id,
            venue,
            format_date(entered_on)
        );
        Ok(id)
    }

    /// The flagged current stay, or the latest entry when none is flagged
    pub fn current(&self, painting_id: i64) -> CatalogResult<Option<LocationRecord>> {
        let conn = lock(&self.conn)?;
        let location = conn
            .query_row(
                &format!(
                    "SELECT {} FROM locations WHERE painting_id = ?
                     ORDER BY is_current DESC, entry_date DESC, id DESC LIMIT 1",
                    LOCATION_COLUMNS
                ),
                [painting_id],
                Self::row_to_location,
            )
            .optional()?;
        Ok(location)
    }

    /// All stays, most recent entry first
    pub fn list_for_painting(&self, painting_id: i64) -> CatalogResult<Vec<LocationRecord>> {
        self.history(painting_id, None, None)
    }

    /// Stays entered within `[from, to]`, most recent first
    pub fn history(
        &self,
        painting_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> CatalogResult<Vec<LocationRecord>> {
        let mut query = QueryBuilder::new(&format!("SELECT {} FROM locations", LOCATION_COLUMNS));
        query
            .equals("painting_id", painting_id)
            .at_least("entry_date", from)
            .at_most("entry_date", to)
            .order_by("entry_date DESC, id DESC");

        let conn = lock(&self.conn)?;
        Ok(query.fetch(&conn, Self::row_to_location)?)
    }

    /// Paintings that are, or were, at `venue`
    pub fn paintings_at(&self, venue: &str, only_current: bool) -> CatalogResult<Vec<PaintingAtVenue>> {
        let mut query = QueryBuilder::new(
            "SELECT p.id, p.title, l.entry_date, l.exit_date, l.is_current
             FROM locations l
             JOIN paintings p ON p.id = l.painting_id",
        );
        query.equals("l.venue", venue.to_string());
        if only_current {
            query.equals("l.is_current", true);
        }
        query.order_by("l.entry_date DESC, p.title COLLATE NOCASE");

        let conn = lock(&self.conn)?;
        let rows = query.fetch(&conn, |row| {
            Ok(PaintingAtVenue {
                painting_id: row.get(0)?,
                title: row.get(1)?,
                entry_date: row.get(2)?,
                exit_date: row.get(3)?,
                is_current: row.get(4)?,
            })
        })?;
        Ok(rows)
    }

    /// Distinct venues with the number of recorded stays
    pub fn venues(&self) -> CatalogResult<Vec<VenueSummary>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT venue, COUNT(*) FROM locations GROUP BY venue ORDER BY venue COLLATE NOCASE",
        )?;
        let venues = stmt
            .query_map([], |row| {
                Ok(VenueSummary {
                    venue: row.get(0)?,
                    stays: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(venues)
    }

    /// Length of one stay; open stays are measured up to `today`
    pub fn time_at_location(
        &self,
        painting_id: i64,
        location_id: i64,
        today: NaiveDate,
    ) -> CatalogResult<Option<TimeAtLocation>> {
        let conn = lock(&self.conn)?;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {} FROM locations WHERE id = ? AND painting_id = ?",
                    LOCATION_COLUMNS
                ),
                params![location_id, painting_id],
                Self::row_to_location,
            )
            .optional()?;

        Ok(record.map(|r| TimeAtLocation {
            days: days_between(r.entry_date, r.exit_date.unwrap_or(today)),
            venue: r.venue,
            entry_date: r.entry_date,
            exit_date: r.exit_date,
        }))
    }

    pub fn delete(&self, id: i64) -> CatalogResult<bool> {
        let conn = lock(&self.conn)?;
        let rows = conn.execute("DELETE FROM locations WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    fn row_to_location(row: &Row) -> rusqlite::Result<LocationRecord> {
        Ok(LocationRecord {
            id: row.get(0)?,
            painting_id: row.get(1)?,
            venue: row.get(2)?,
            entry_date: row.get(3)?,
            exit_date: row.get(4)?,
            notes: row.get(5)?,
            is_current: row.get(6)?,
        })
    }
}
