/*!
 * SQLite connection handling shared by the translation cache and the
 * vocabulary store.
 *
 * Connections are opened once and shared behind a mutex; async callers hop
 * onto tokio's blocking pool so SQLite I/O never stalls the runtime.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema;

/// Default translation cache filename
pub const DEFAULT_CACHE_FILENAME: &str = "translation_cache.db";

/// Default vocabulary database filename
pub const DEFAULT_VOCABULARY_FILENAME: &str = "wortschatz.db";

const APP_DIRNAME: &str = "russian-anki";

const IN_MEMORY: &str = ":memory:";

/// Shared handle to one SQLite database with its schema initialized
#[derive(Clone)]
pub struct DatabaseConnection {
    db_path: PathBuf,
    connection: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for DatabaseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConnection")
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl DatabaseConnection {
    /// Open (or create) the database file at `db_path`, creating parent
    /// directories as needed
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening database at: {:?}", db_path);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        Self::from_connection(db_path, conn)
    }

    /// Private database that disappears with the last clone of the handle
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory database");
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;

        Self::from_connection(PathBuf::from(IN_MEMORY), conn)
    }

    fn from_connection(db_path: PathBuf, conn: Connection) -> Result<Self> {
        schema::initialize_schema(&conn)
            .with_context(|| format!("Failed to initialize schema for {:?}", db_path))?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Per-user directory holding both default databases
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .map(|base| base.join(APP_DIRNAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }

    pub fn default_cache_path() -> Result<PathBuf> {
        Ok(Self::default_data_dir()?.join(DEFAULT_CACHE_FILENAME))
    }

    pub fn default_vocabulary_path() -> Result<PathBuf> {
        Ok(Self::default_data_dir()?.join(DEFAULT_VOCABULARY_FILENAME))
    }

    /// File backing this handle, or `:memory:`
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Run `f` on the calling thread while holding the connection lock.
    /// Async code should prefer `execute_async`.
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        f(&self.connection.lock())
    }

    /// Run `f` on the blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.on_blocking_pool(move |conn| f(conn)).await
    }

    /// Run `f` inside a transaction on the blocking pool; commits only when
    /// `f` succeeds
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.on_blocking_pool(move |conn| {
            let tx = conn.transaction()?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
        .await
    }

    async fn on_blocking_pool<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);

        tokio::task::spawn_blocking(move || f(&mut connection.lock()))
            .await
            .context("Database task panicked")?
    }
}
