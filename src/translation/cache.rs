/*!
 * Translation result caching.
 *
 * Results are stored in SQLite keyed by (word, provider) so that a word is
 * only ever sent to a provider once. The cache never fails its caller:
 * storage errors are logged and behave like a miss or a skipped write.
 */

use anyhow::{Context, Result};
use log::{debug, error};
use rusqlite::{OptionalExtension, params};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;

use crate::database::DatabaseConnection;
use crate::language_utils::normalize_word;
use super::models::TranslationResult;

/// Where the cache keeps its data
#[derive(Debug, Clone, PartialEq, Eq)]
enum CacheLocation {
    File(PathBuf),
    /// Private database, gone when the last clone of the cache is dropped
    InMemory,
}

impl CacheLocation {
    /// Create directories, open the file and initialize the schema on the
    /// blocking pool
    async fn open(self) -> Result<DatabaseConnection> {
        tokio::task::spawn_blocking(move || match self {
            CacheLocation::File(path) => DatabaseConnection::new(path),
            CacheLocation::InMemory => DatabaseConnection::new_in_memory(),
        })
        .await
        .context("Cache open task panicked")?
    }
}

/// Counters describing cache usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found an entry
    pub hits: usize,
    /// Lookups that found nothing (including failed lookups)
    pub misses: usize,
    /// Entries written
    pub writes: usize,
    /// Storage or deserialization failures
    pub errors: usize,
}

impl CacheStats {
    /// Ratio of hits to lookups
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Total number of lookups and writes
    pub fn accesses(&self) -> usize {
        self.hits + self.misses + self.writes
    }
}

#[derive(Debug)]
struct CacheInner {
    location: CacheLocation,
    db: OnceCell<DatabaseConnection>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    writes: AtomicUsize,
    errors: AtomicUsize,
}

impl CacheInner {
    /// Open the database on first use; concurrent callers wait for one open
    async fn connection(&self) -> Result<DatabaseConnection> {
        self.db
            .get_or_try_init(|| self.location.clone().open())
            .await
            .cloned()
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// Persistent cache of translation results
///
/// Cloning is cheap; clones share the same connection and counters.
#[derive(Debug, Clone)]
pub struct ResultCache {
    inner: Option<Arc<CacheInner>>,
}

impl ResultCache {
    fn with_location(location: CacheLocation) -> Self {
        Self {
            inner: Some(Arc::new(CacheInner {
                location,
                db: OnceCell::new(),
                hits: AtomicUsize::new(0),
                misses: AtomicUsize::new(0),
                writes: AtomicUsize::new(0),
                errors: AtomicUsize::new(0),
            })),
        }
    }

    /// Create a cache backed by the SQLite file at `path`
    ///
    /// The file and its schema are created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_location(CacheLocation::File(path.into()))
    }

    /// Create a cache backed by a private in-memory database
    pub fn in_memory() -> Self {
        Self::with_location(CacheLocation::InMemory)
    }

    /// Create a cache that stores nothing and always misses
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Look up the cached result for `word` under `provider`
    pub async fn get(&self, word: &str, provider: &str) -> Option<TranslationResult> {
        let inner = self.inner.as_ref()?;
        let key = normalize_word(word);

        let db = match inner.connection().await {
            Ok(db) => db,
            Err(e) => {
                inner.record_error();
                inner.misses.fetch_add(1, Ordering::Relaxed);
                error!("Error opening translation cache: {:#}", e);
                return None;
            }
        };

        let (lookup_word, lookup_provider) = (key.clone(), provider.to_string());
        let lookup = db
            .execute_async(move |conn| {
                let row: Option<String> = conn
                    .query_row(
                        "SELECT result FROM translations WHERE word = ?1 AND provider = ?2",
                        params![lookup_word, lookup_provider],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(row)
            })
            .await;

        match lookup {
            Ok(Some(json)) => match serde_json::from_str::<TranslationResult>(&json) {
                Ok(result) => {
                    inner.hits.fetch_add(1, Ordering::Relaxed);
                    debug!("Cache hit for '{}' using provider '{}'", key, provider);
                    Some(result)
                }
                Err(e) => {
                    inner.record_error();
                    inner.misses.fetch_add(1, Ordering::Relaxed);
                    error!("Corrupt cache entry for '{}' ({}): {}", key, provider, e);
                    None
                }
            },
            Ok(None) => {
                inner.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss for '{}' using provider '{}'", key, provider);
                None
            }
            Err(e) => {
                inner.record_error();
                inner.misses.fetch_add(1, Ordering::Relaxed);
                error!("Error retrieving '{}' from cache: {:#}", key, e);
                None
            }
        }
    }

    /// Store `result` for `word` under `provider`, replacing any older entry
    pub async fn set(&self, word: &str, provider: &str, result: &TranslationResult) {
        let Some(inner) = self.inner.as_ref() else {
            return;
        };
        let key = normalize_word(word);

        let json = match serde_json::to_string(result) {
            Ok(json) => json,
            Err(e) => {
                inner.record_error();
                error!("Failed to serialize translation for '{}': {}", key, e);
                return;
            }
        };

        let db = match inner.connection().await {
            Ok(db) => db,
            Err(e) => {
                inner.record_error();
                error!("Error opening translation cache: {:#}", e);
                return;
            }
        };

        let (store_word, store_provider) = (key.clone(), provider.to_string());
        let timestamp = chrono::Utc::now().timestamp();
        let stored = db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT OR REPLACE INTO translations (word, provider, result, timestamp)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                    params![store_word, store_provider, json, timestamp],
                )?;
                Ok(())
            })
            .await;

        match stored {
            Ok(()) => {
                inner.writes.fetch_add(1, Ordering::Relaxed);
                debug!("Cached translation for '{}' using provider '{}'", key, provider);
            }
            Err(e) => {
                inner.record_error();
                error!("Error storing '{}' in cache: {:#}", key, e);
            }
        }
    }

    /// Number of stored entries (0 when disabled or unreadable)
    pub async fn len(&self) -> usize {
        let Some(inner) = self.inner.as_ref() else {
            return 0;
        };
        let db = match inner.connection().await {
            Ok(db) => db,
            Err(e) => {
                error!("Error opening translation cache: {:#}", e);
                return 0;
            }
        };

        db.execute_async(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM translations", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
        .unwrap_or_else(|e| {
            error!("Error counting cache entries: {:#}", e);
            0
        })
    }

    /// Check if the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        match self.inner.as_ref() {
            Some(inner) => CacheStats {
                hits: inner.hits.load(Ordering::Relaxed),
                misses: inner.misses.load(Ordering::Relaxed),
                writes: inner.writes.load(Ordering::Relaxed),
                errors: inner.errors.load(Ordering::Relaxed),
            },
            None => CacheStats::default(),
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::disabled()
    }
}
