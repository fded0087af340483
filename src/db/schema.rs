/// SQL schema for the painting catalog

pub const SCHEMA_VERSION: i32 = 1;

pub const CREATE_TABLES: &str = r#"
-- Paintings
CREATE TABLE IF NOT EXISTS paintings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    technique TEXT,
    size TEXT,
    creation_date TEXT,
    location TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_paintings_title ON paintings(title);

-- Series
CREATE TABLE IF NOT EXISTS series (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    start_period TEXT,
    end_period TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Exhibitions
CREATE TABLE IF NOT EXISTS exhibitions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    theme TEXT,
    kind TEXT,
    artists TEXT,
    date TEXT,
    venue TEXT,
    curator TEXT,
    organizer TEXT,
    period TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Painting <-> series
CREATE TABLE IF NOT EXISTS painting_series (
    painting_id INTEGER NOT NULL,
    series_id INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (painting_id, series_id),
    FOREIGN KEY (painting_id) REFERENCES paintings(id),
    FOREIGN KEY (series_id) REFERENCES series(id)
);

CREATE INDEX IF NOT EXISTS idx_painting_series_series ON painting_series(series_id);

-- Painting <-> exhibition
CREATE TABLE IF NOT EXISTS painting_exhibitions (
    painting_id INTEGER NOT NULL,
    exhibition_id INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (painting_id, exhibition_id),
    FOREIGN KEY (painting_id) REFERENCES paintings(id),
    FOREIGN KEY (exhibition_id) REFERENCES exhibitions(id)
);

CREATE INDEX IF NOT EXISTS idx_painting_exhibitions_exhibition ON painting_exhibitions(exhibition_id);

-- Photos (paths only, files live in the library)
CREATE TABLE IF NOT EXISTS photos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    painting_id INTEGER NOT NULL,
    path TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    FOREIGN KEY (painting_id) REFERENCES paintings(id)
);

CREATE INDEX IF NOT EXISTS idx_photos_painting ON photos(painting_id);

-- Prices
CREATE TABLE IF NOT EXISTS prices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    painting_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    evaluation_date TEXT NOT NULL,
    notes TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    FOREIGN KEY (painting_id) REFERENCES paintings(id)
);

CREATE INDEX IF NOT EXISTS idx_prices_painting ON prices(painting_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_prices_one_active ON prices(painting_id) WHERE active = 1;

-- Locations
CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    painting_id INTEGER NOT NULL,
    venue TEXT NOT NULL,
    entry_date TEXT NOT NULL,
    exit_date TEXT,
    notes TEXT,
    is_current INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (painting_id) REFERENCES paintings(id)
);

CREATE INDEX IF NOT EXISTS idx_locations_painting ON locations(painting_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_locations_one_current ON locations(painting_id) WHERE is_current = 1;

-- Migration history
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Tables every catalog database must have
pub const CATALOG_TABLES: &[&str] = &[
    "paintings",
    "series",
    "exhibitions",
    "painting_series",
    "painting_exhibitions",
    "photos",
    "prices",
    "locations",
];
