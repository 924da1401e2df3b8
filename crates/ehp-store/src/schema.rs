use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    // Every row carries its dataset name and its position in the source
    // registry, so a dataset loads back in the order it was imported.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS datasets (
            name        TEXT PRIMARY KEY,
            source      TEXT NOT NULL DEFAULT '',
            imported_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS generators (
            dataset          TEXT NOT NULL REFERENCES datasets(name) ON DELETE CASCADE,
            position         INTEGER NOT NULL,
            name             TEXT NOT NULL,
            x                INTEGER NOT NULL,
            y                INTEGER NOT NULL,
            adams_filtration INTEGER NOT NULL,
            torsion          INTEGER,
            alg_name         TEXT,
            hom_name         TEXT,
            induced_name     TEXT NOT NULL DEFAULT '[]',
            born             INTEGER,
            dies             INTEGER,
            PRIMARY KEY (dataset, position)
        );

        CREATE TABLE IF NOT EXISTS differentials (
            dataset        TEXT NOT NULL REFERENCES datasets(name) ON DELETE CASCADE,
            position       INTEGER NOT NULL,
            from_gen       TEXT NOT NULL,
            to_gen         TEXT NOT NULL,
            coeff          INTEGER NOT NULL,
            page           INTEGER NOT NULL,
            kind           TEXT NOT NULL DEFAULT 'Real',
            synthetic_only INTEGER NOT NULL DEFAULT 0,
            proof          TEXT,
            PRIMARY KEY (dataset, position)
        );

        CREATE TABLE IF NOT EXISTS multiplications (
            dataset  TEXT NOT NULL REFERENCES datasets(name) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            from_gen TEXT NOT NULL,
            to_gen   TEXT NOT NULL,
            internal INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (dataset, position)
        );

        CREATE TABLE IF NOT EXISTS tau_mults (
            dataset  TEXT NOT NULL REFERENCES datasets(name) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            from_gen TEXT NOT NULL,
            to_gen   TEXT NOT NULL,
            PRIMARY KEY (dataset, position)
        );

        CREATE INDEX IF NOT EXISTS idx_gen_name ON generators(dataset, name);
        CREATE INDEX IF NOT EXISTS idx_diff_endpoints ON differentials(dataset, from_gen, to_gen);
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT value FROM metadata WHERE key = 'schema_version'")?;
    let version = stmt
        .query_row([], |row| {
            let v: String = row.get(0)?;
            Ok(v.parse::<i64>().unwrap_or(0))
        })
        .ok();
    Ok(version)
}
