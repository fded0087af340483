use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::query::QueryBuilder;
use super::{lock, SharedConnection};
use crate::models::{NewPrice, Price, PriceStatistics, PricedPainting};
use crate::utils::CatalogResult;

const PRICE_COLUMNS: &str = "id, painting_id, amount, evaluation_date, notes, active";

pub struct PriceRepository {
    conn: SharedConnection,
}

impl PriceRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Record a price. An active price replaces the painting's previous active one.
    pub fn add(&self, price: &NewPrice) -> CatalogResult<i64> {
        price.validate()?;

        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let id = Self::insert(&tx, price)?;
        tx.commit()?;

        info!(
            "Added price {} ({:.2}) for painting {}",
            id, price.amount, price.painting_id
        );
        Ok(id)
    }

    /// Deactivate-then-insert. Callers provide the transaction.
    pub(crate) fn insert(conn: &Connection, price: &NewPrice) -> rusqlite::Result<i64> {
        if price.active {
            conn.execute(
                "UPDATE prices SET active = 0 WHERE painting_id = ? AND active = 1",
                [price.painting_id],
            )?;
        }

        conn.execute(
            "INSERT INTO prices (painting_id, amount, evaluation_date, notes, active)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                price.painting_id,
                price.amount,
                price.evaluation_date,
                price.notes,
                price.active,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Make `amount` the painting's current price
    pub fn set_current(
        &self,
        painting_id: i64,
        amount: f64,
        evaluation_date: NaiveDate,
        notes: Option<&str>,
    ) -> CatalogResult<i64> {
        let mut price = NewPrice::new(painting_id, amount, evaluation_date);
        price.notes = notes.map(str::to_string);
        self.add(&price)
    }

    /// The active price, or the most recent one when none is flagged
    pub fn current(&self, painting_id: i64) -> CatalogResult<Option<Price>> {
        let conn = lock(&self.conn)?;
        let price = conn
            .query_row(
                &format!(
                    "SELECT {} FROM prices WHERE painting_id = ?
                     ORDER BY active DESC, evaluation_date DESC, id DESC LIMIT 1",
                    PRICE_COLUMNS
                ),
                [painting_id],
                Self::row_to_price,
            )
            .optional()?;
        Ok(price)
    }

    /// Full price history, newest first
    pub fn list_for_painting(&self, painting_id: i64) -> CatalogResult<Vec<Price>> {
        self.history(painting_id, None, None)
    }

    /// Prices evaluated within `[from, to]`, newest first
    pub fn history(
        &self,
        painting_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> CatalogResult<Vec<Price>> {
        let mut query = QueryBuilder::new(&format!("SELECT {} FROM prices", PRICE_COLUMNS));
        query
            .equals("painting_id", painting_id)
            .at_least("evaluation_date", from)
            .at_most("evaluation_date", to)
            .order_by("evaluation_date DESC, id DESC");

        let conn = lock(&self.conn)?;
        Ok(query.fetch(&conn, Self::row_to_price)?)
    }

    /// Paintings whose active price falls within the bounds, cheapest first
    pub fn paintings_in_range(
        &self,
        min: Option<f64>,
        max: Option<f64>,
    ) -> CatalogResult<Vec<PricedPainting>> {
        let mut query = QueryBuilder::new(
            "SELECT p.id, p.title, pr.amount, pr.evaluation_date
             FROM prices pr
             JOIN paintings p ON p.id = pr.painting_id",
        );
        query
            .equals("pr.active", true)
            .at_least("pr.amount", min)
            .at_most("pr.amount", max)
            .order_by("pr.amount, p.title COLLATE NOCASE");

        let conn = lock(&self.conn)?;
        let rows = query.fetch(&conn, |row| {
            Ok(PricedPainting {
                painting_id: row.get(0)?,
                title: row.get(1)?,
                amount: row.get(2)?,
                evaluation_date: row.get(3)?,
            })
        })?;
        Ok(rows)
    }

    pub fn statistics(&self, painting_id: i64) -> CatalogResult<PriceStatistics> {
        let conn = lock(&self.conn)?;
        let stats = conn.query_row(
            "SELECT MIN(amount), MAX(amount), AVG(amount), COUNT(*)
             FROM prices WHERE painting_id = ?",
            [painting_id],
            |row| {
                Ok(PriceStatistics {
                    min: row.get(0)?,
                    max: row.get(1)?,
                    average: row.get(2)?,
                    count: row.get(3)?,
                })
            },
        )?;
        Ok(stats)
    }

    pub fn delete(&self, id: i64) -> CatalogResult<bool> {
        let conn = lock(&self.conn)?;
        let rows = conn.execute("DELETE FROM prices WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    fn row_to_price(row: &Row) -> rusqlite::Result<Price> {
        Ok(Price {
            id: row.get(0)?,
            painting_id: row.get(1)?,
            amount: row.get(2)?,
            evaluation_date: row.get(3)?,
            notes: row.get(4)?,
            active: row.get(5)?,
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

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_active_price_replaces_previous() {
        let db = setup_db();
        let painting = db.paintings().add(&NewPainting::new("Meadow")).unwrap();

        db.prices().set_current(painting, 500.0, date(2023, 5, 1), None).unwrap();
        db.prices()
            .set_current(painting, 600.0, date(2024, 5, 1), Some("After restoration"))
            .unwrap();

        let current = db.prices().current(painting).unwrap().unwrap();
        assert_eq!(current.amount, 600.0);
        assert!(current.active);
        assert_eq!(current.notes.as_deref(), Some("After restoration"));

        let history = db.prices().list_for_painting(painting).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().filter(|p| p.active).count(), 1);
        assert_eq!(history[1].amount, 500.0);
        assert!(!history[1].active);
    }

    #[test]
    fn test_historical_price_keeps_current() {
        let db = setup_db();
        let painting = db.paintings().add(&NewPainting::new("Dunes")).unwrap();

        db.prices().add(&NewPrice::new(painting, 800.0, date(2020, 1, 1))).unwrap();
        db.prices()
            .add(&NewPrice::new(painting, 900.0, date(2024, 1, 1)).historical())
            .unwrap();

        // flagged row wins over the more recent one
        let current = db.prices().current(painting).unwrap().unwrap();
        assert_eq!(current.amount, 800.0);
    }

    #[test]
    fn test_current_falls_back_to_latest_date() {
        let db = setup_db();
        let painting = db.paintings().add(&NewPainting::new("Ruins")).unwrap();
        assert!(db.prices().current(painting).unwrap().is_none());

        db.prices().add(&NewPrice::new(painting, 100.0, date(2019, 1, 1)).historical()).unwrap();
        db.prices().add(&NewPrice::new(painting, 150.0, date(2021, 1, 1)).historical()).unwrap();

        let current = db.prices().current(painting).unwrap().unwrap();
        assert_eq!(current.amount, 150.0);
    }

    #[test]
    fn test_history_range_and_statistics() {
        let db = setup_db();
        let painting = db.paintings().add(&NewPainting::new("Canal")).unwrap();
        for (amount, year) in [(100.0, 2018), (200.0, 2020), (300.0, 2022)] {
            db.prices()
                .add(&NewPrice::new(painting, amount, date(year, 6, 1)).historical())
                .unwrap();
        }

        let ranged = db
            .prices()
            .history(painting, Some(date(2019, 1, 1)), Some(date(2021, 12, 31)))
            .unwrap();
        assert_eq!(ranged.len(), 1);
        assert_eq!(ranged[0].amount, 200.0);

        let stats = db.prices().statistics(painting).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, Some(100.0));
        assert_eq!(stats.max, Some(300.0));
        assert_eq!(stats.average, Some(200.0));

        let empty = db.prices().statistics(painting + 1).unwrap();
        assert_eq!(empty.count, 0);
        assert_eq!(empty.average, None);
    }

    #[test]
    fn test_paintings_in_range_uses_active_prices() {
        let db = setup_db();
        let cheap = db.paintings().add(&NewPainting::new("Cheap")).unwrap();
        let dear = db.paintings().add(&NewPainting::new("Dear")).unwrap();
        db.prices().set_current(cheap, 50.0, date(2024, 1, 1), None).unwrap();
        db.prices().set_current(dear, 5000.0, date(2024, 1, 1), None).unwrap();
        db.prices()
            .add(&NewPrice::new(cheap, 4000.0, date(2010, 1, 1)).historical())
            .unwrap();

        let mid = db.prices().paintings_in_range(Some(1000.0), None).unwrap();
        assert_eq!(mid.len(), 1);
        assert_eq!(mid[0].title, "Dear");

        let all = db.prices().paintings_in_range(None, None).unwrap();
        let titles: Vec<_> = all.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Cheap", "Dear"]);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let db = setup_db();
        let painting = db.paintings().add(&NewPainting::new("Debt")).unwrap();
        assert!(db
            .prices()
            .add(&NewPrice::new(painting, -1.0, date(2024, 1, 1)))
            .is_err());
        assert!(db.prices().list_for_painting(painting).unwrap().is_empty());
    }
}
