/*!
 * Table definitions for the translation cache and the vocabulary store.
 *
 * Both databases share one schema; the version lives in SQLite's
 * `user_version` pragma. Unversioned cache files whose `translations` table
 * is keyed by word alone are rebuilt with the (word, provider) key.
 */

use anyhow::{Context, Result, bail};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

const CREATE_TABLES: &str = r#"
    -- one cached result per (word, provider); newer writes replace older ones
    CREATE TABLE IF NOT EXISTS translations (
        word TEXT NOT NULL,
        provider TEXT NOT NULL,
        result TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        PRIMARY KEY (word, provider)
    );

    CREATE TABLE IF NOT EXISTS vocabulary (
        word TEXT PRIMARY KEY,
        translation TEXT,
        added_at TEXT NOT NULL
    );
"#;

const MIGRATE_WORD_KEYED_TRANSLATIONS: &str = r#"
    ALTER TABLE translations RENAME TO translations_word_keyed;

    CREATE TABLE translations (
        word TEXT NOT NULL,
        provider TEXT NOT NULL,
        result TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        PRIMARY KEY (word, provider)
    );

    INSERT OR REPLACE INTO translations (word, provider, result, timestamp)
        SELECT word, provider, result, COALESCE(timestamp, 0)
        FROM translations_word_keyed
        WHERE word IS NOT NULL AND provider IS NOT NULL AND result IS NOT NULL;

    DROP TABLE translations_word_keyed;
"#;

/// Create missing tables and stamp the schema version.
///
/// Calling it on an initialized database is a no-op. A database written by a
/// newer release is rejected rather than modified.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let version = schema_version(conn)?;

    match version {
        0 => {
            info!("Initializing database schema v{}", SCHEMA_VERSION);
            // In-memory databases keep their "memory" journal
            conn.execute_batch("PRAGMA journal_mode=WAL;")
                .context("Failed to enable WAL journal")?;
            if translations_key(conn)? == ["word"] {
                info!("Rebuilding word-keyed translations table with (word, provider) key");
                conn.execute_batch(&format!("BEGIN; {} COMMIT;", MIGRATE_WORD_KEYED_TRANSLATIONS))
                    .context("Failed to migrate word-keyed translations table")?;
            }
            conn.execute_batch(CREATE_TABLES)
                .context("Failed to create tables")?;
            conn.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))?;
        }
        SCHEMA_VERSION => debug!("Database schema is up to date (v{})", version),
        newer => bail!(
            "Database schema v{} is newer than supported v{}",
            newer,
            SCHEMA_VERSION
        ),
    }

    Ok(())
}

fn schema_version(conn: &Connection) -> Result<i32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("Failed to read schema version")
}

/// Primary-key columns of an existing `translations` table, in key order
fn translations_key(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM pragma_table_info('translations') WHERE pk > 0 ORDER BY pk",
    )?;
    let columns = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(columns)
}
