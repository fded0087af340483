use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::query::{QueryBuilder, UpdateBuilder};
use super::{lock, SharedConnection};
use crate::models::{
    Exhibition, ExhibitionFilter, ExhibitionSummary, ExhibitionUpdate, NewExhibition,
};
use crate::utils::{CatalogError, CatalogResult};

const EXHIBITION_COLUMNS: &str = "e.id, e.name, e.theme, e.kind, e.artists, e.date, e.venue,
     e.curator, e.organizer, e.period, e.created_at, e.updated_at";

pub struct ExhibitionRepository {
    conn: SharedConnection,
}

impl ExhibitionRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// All exhibitions ordered by name
    pub fn list(&self) -> CatalogResult<Vec<Exhibition>> {
        let mut query = QueryBuilder::new(&format!("SELECT {} FROM exhibitions e", EXHIBITION_COLUMNS));
        query.order_by("e.name COLLATE NOCASE, e.id");

        let conn = lock(&self.conn)?;
        Ok(query.fetch(&conn, Self::row_to_exhibition)?)
    }

    /// Filtered listing with painting counts
    pub fn search(&self, filter: &ExhibitionFilter) -> CatalogResult<Vec<ExhibitionSummary>> {
        let mut query = QueryBuilder::new(
            "SELECT e.id, e.name, e.date, e.venue, COUNT(pe.painting_id) AS painting_count
             FROM exhibitions e
             LEFT JOIN painting_exhibitions pe ON pe.exhibition_id = e.id",
        );
        query
            .contains("e.name", filter.name.as_deref())
            .contains("e.venue", filter.venue.as_deref())
            .contains("e.date", filter.year.as_deref())
            .group_by("e.id");

        if filter.only_with_paintings {
            query.having("COUNT(pe.painting_id) > 0");
        }
        query.order_by("e.name COLLATE NOCASE, e.id");

        let conn = lock(&self.conn)?;
        let rows = query.fetch(&conn, |row| {
            Ok(ExhibitionSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                date: row.get(2)?,
                venue: row.get(3)?,
                painting_count: row.get(4)?,
            })
        })?;
        Ok(rows)
    }

    pub fn get(&self, id: i64) -> CatalogResult<Option<Exhibition>> {
        let conn = lock(&self.conn)?;
        let exhibition = conn
            .query_row(
                &format!("SELECT {} FROM exhibitions e WHERE e.id = ?", EXHIBITION_COLUMNS),
                [id],
                Self::row_to_exhibition,
            )
            .optional()?;
        Ok(exhibition)
    }

    /// Exhibitions a painting was shown in, most recent date first
    pub fn find_by_painting(&self, painting_id: i64) -> CatalogResult<Vec<Exhibition>> {
        let mut query = QueryBuilder::new(&format!(
            "SELECT {} FROM exhibitions e
             JOIN painting_exhibitions pe ON pe.exhibition_id = e.id",
            EXHIBITION_COLUMNS
        ));
        query
            .equals("pe.painting_id", painting_id)
            .order_by("e.date DESC, e.name COLLATE NOCASE");

        let conn = lock(&self.conn)?;
        Ok(query.fetch(&conn, Self::row_to_exhibition)?)
    }

    pub fn add(&self, exhibition: &NewExhibition) -> CatalogResult<i64> {
        exhibition.validate()?;

        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let id = Self::insert(&tx, exhibition)?;
        tx.commit()?;

        info!("Added exhibition {} ({})", id, exhibition.name);
        Ok(id)
    }

    pub(crate) fn insert(conn: &Connection, exhibition: &NewExhibition) -> rusqlite::Result<i64> {
        conn.execute(
            "INSERT INTO exhibitions (name, theme, kind, artists, date, venue, curator, organizer, period)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                exhibition.name,
                exhibition.theme,
                exhibition.kind,
                exhibition.artists,
                exhibition.date,
                exhibition.venue,
                exhibition.curator,
                exhibition.organizer,
                exhibition.period,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, changes: &ExhibitionUpdate) -> CatalogResult<bool> {
        if let Some(name) = &changes.name {
            NewExhibition::new(name.clone()).validate()?;
        }

        let mut update = UpdateBuilder::new("exhibitions");
        update
            .set("name", changes.name.clone())
            .set("theme", changes.theme.clone())
            .set("kind", changes.kind.clone())
            .set("artists", changes.artists.clone())
            .set("date", changes.date.clone())
            .set("venue", changes.venue.clone())
            .set("curator", changes.curator.clone())
            .set("organizer", changes.organizer.clone())
            .set("period", changes.period.clone());

        let conn = lock(&self.conn)?;
        if update.is_empty() {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM exhibitions WHERE id = ?)",
                [id],
                |row| row.get(0),
            )?;
            return Ok(exists);
        }

        Ok(update.execute(&conn, id)? > 0)
    }

    /// Delete an exhibition without paintings.
    ///
    /// Fails with [`CatalogError::InUse`] carrying the number of associated paintings.
    pub fn delete(&self, id: i64) -> CatalogResult<bool> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM painting_exhibitions WHERE exhibition_id = ?",
            [id],
            |row| row.get(0),
        )?;

        if count > 0 {
            return Err(CatalogError::InUse {
                entity: "exhibition",
                id,
                count,
            });
        }

        let rows = tx.execute("DELETE FROM exhibitions WHERE id = ?", [id])?;
        tx.commit()?;

        if rows > 0 {
            info!("Deleted exhibition {}", id);
        }
        Ok(rows > 0)
    }

    /// All exhibition ids with their names, for folder reconciliation
    pub fn names(&self) -> CatalogResult<Vec<(i64, String)>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare("SELECT id, name FROM exhibitions ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> CatalogResult<i64> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM exhibitions", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_exhibition(row: &Row) -> rusqlite::Result<Exhibition> {
        Ok(Exhibition {
            id: row.get(0)?,
            name: row.get(1)?,
            theme: row.get(2)?,
            kind: row.get(3)?,
            artists: row.get(4)?,
            date: row.get(5)?,
            venue: row.get(6)?,
            curator: row.get(7)?,
            organizer: row.get(8)?,
            period: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::NewPainting;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let db = setup_db();
        let new = NewExhibition {
            name: "Retrospective".into(),
            theme: Some("Forty years".into()),
            kind: Some("Solo".into()),
            artists: Some("A. Painter".into()),
            date: Some("2024".into()),
            venue: Some("City Museum".into()),
            curator: Some("C. Urator".into()),
            organizer: Some("City".into()),
            period: Some("March-June".into()),
        };

        let id = db.exhibitions().add(&new).unwrap();
        let found = db.exhibitions().get(id).unwrap().unwrap();

        assert_eq!(found.name, new.name);
        assert_eq!(found.kind, new.kind);
        assert_eq!(found.venue, new.venue);
        assert_eq!(found.period, new.period);
        assert!(db.exhibitions().get(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_search_with_counts() {
        let db = setup_db();
        let spring = db
            .exhibitions()
            .add(&NewExhibition::new("Spring Show").with_venue("Gallery North").with_date("2023-04"))
            .unwrap();
        db.exhibitions()
            .add(&NewExhibition::new("Winter Show").with_venue("Gallery South").with_date("2024-01"))
            .unwrap();

        let painting = db.paintings().add(&NewPainting::new("Blossom")).unwrap();
        db.exhibition_links().associate(painting, spring).unwrap();

        let shows = db
            .exhibitions()
            .search(&ExhibitionFilter {
                name: Some("show".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(shows.len(), 2);
        assert_eq!(shows[0].name, "Spring Show");
        assert_eq!(shows[0].painting_count, 1);
        assert_eq!(shows[1].painting_count, 0);

        let active = db
            .exhibitions()
            .search(&ExhibitionFilter {
                only_with_paintings: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(active.len(), 1);

        let in_2024 = db
            .exhibitions()
            .search(&ExhibitionFilter {
                year: Some("2024".into()),
                venue: Some("south".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(in_2024.len(), 1);
        assert_eq!(in_2024[0].name, "Winter Show");
    }

    #[test]
    fn test_delete_reports_blocking_count() {
        let db = setup_db();
        let expo = db.exhibitions().add(&NewExhibition::new("Group Show")).unwrap();
        for title in ["A", "B", "C"] {
            let p = db.paintings().add(&NewPainting::new(title)).unwrap();
            db.exhibition_links().associate(p, expo).unwrap();
        }

        match db.exhibitions().delete(expo) {
            Err(CatalogError::InUse { count, entity, .. }) => {
                assert_eq!(count, 3);
                assert_eq!(entity, "exhibition");
            }
            other => panic!("expected InUse, got {:?}", other),
        }

        let empty = db.exhibitions().add(&NewExhibition::new("Empty Room")).unwrap();
        assert!(db.exhibitions().delete(empty).unwrap());
        assert!(!db.exhibitions().delete(empty).unwrap());
    }

    #[test]
    fn test_update_and_find_by_painting() {
        let db = setup_db();
        let expo = db.exhibitions().add(&NewExhibition::new("Draft Name")).unwrap();
        let painting = db.paintings().add(&NewPainting::new("Piece")).unwrap();
        db.exhibition_links().associate(painting, expo).unwrap();

        assert!(db
            .exhibitions()
            .update(
                expo,
                &ExhibitionUpdate {
                    name: Some("Final Name".into()),
                    venue: Some(Some("Annex".into())),
                    ..Default::default()
                },
            )
            .unwrap());

        let shown_in = db.exhibitions().find_by_painting(painting).unwrap();
        assert_eq!(shown_in.len(), 1);
        assert_eq!(shown_in[0].name, "Final Name");
        assert_eq!(shown_in[0].venue.as_deref(), Some("Annex"));
    }
}
