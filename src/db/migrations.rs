use rusqlite::Connection;
use tracing::{info, warn};

use super::schema::{CREATE_TABLES, SCHEMA_VERSION};
use crate::utils::CatalogResult;

/// Create or upgrade the schema. Safe to run on every start.
pub fn run_migrations(conn: &Connection) -> CatalogResult<()> {
    let current_version = get_current_version(conn)?;

    if current_version == 0 {
        info!("Creating new database with schema version {}", SCHEMA_VERSION);
        initial_setup(conn)?;
    } else if current_version > SCHEMA_VERSION {
        warn!(
            "Database schema version {} is newer than supported version {}",
            current_version, SCHEMA_VERSION
        );
    } else {
        info!("Database is up to date (version {})", current_version);
    }

    Ok(())
}

fn get_current_version(conn: &Connection) -> CatalogResult<i32> {
    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_migrations')",
        [],
        |row| row.get(0),
    )?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> = conn.query_row(
        "SELECT MAX(version) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    Ok(version.unwrap_or(0))
}

fn initial_setup(conn: &Connection) -> CatalogResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(CREATE_TABLES)?;
    tx.execute(
        "INSERT INTO schema_migrations (version) VALUES (?)",
        [SCHEMA_VERSION],
    )?;

    tx.commit()?;

    info!("Initial setup complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::CATALOG_TABLES;

    #[test]
    fn test_initial_migration() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        for table in CATALOG_TABLES {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }
    }

    #[test]
    fn test_idempotent_migration() {
        let conn = Connection::open_in_memory().unwrap();

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version = get_current_version(&conn).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_single_active_price_enforced_by_index() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        conn.execute("INSERT INTO paintings (title) VALUES ('A')", []).unwrap();
        conn.execute(
            "INSERT INTO prices (painting_id, amount, evaluation_date, active) VALUES (1, 10.0, '2024-01-01', 1)",
            [],
        )
        .unwrap();

        let second = conn.execute(
            "INSERT INTO prices (painting_id, amount, evaluation_date, active) VALUES (1, 20.0, '2024-02-01', 1)",
            [],
        );
        assert!(second.is_err());
    }
}
