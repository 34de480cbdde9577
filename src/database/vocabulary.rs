/*!
 * Vocabulary storage.
 *
 * Remembers which words the learner has already seen so that repeated runs
 * only translate new vocabulary.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use rusqlite::params;
use std::collections::HashSet;

use super::connection::DatabaseConnection;
use crate::translation::models::TranslationResult;

/// Source of already-known words and sink for newly seen ones
#[async_trait]
pub trait KnownVocabulary: Send + Sync {
    /// All known words, lowercased
    async fn known_words(&self) -> Result<HashSet<String>>;

    /// Record words as known; returns how many were new
    async fn add_words(&self, words: &[String]) -> Result<usize>;
}

/// SQLite-backed vocabulary store
#[derive(Debug, Clone)]
pub struct VocabularyStore {
    db: DatabaseConnection,
}

impl VocabularyStore {
    /// Create a store on an open database
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Remove known words from a candidate set
    pub async fn filter_unknown<I>(&self, words: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = String>,
    {
        let known = self.known_words().await?;
        let unknown: Vec<String> = words
            .into_iter()
            .filter(|w| !known.contains(&w.to_lowercase()))
            .collect();
        debug!("{} known words filtered, {} new", known.len(), unknown.len());
        Ok(unknown)
    }

    /// Store translations next to their words, inserting words that are missing
    pub async fn add_entries(&self, entries: &[TranslationResult]) -> Result<usize> {
        let entries: Vec<(String, String)> = entries
            .iter()
            .map(|e| (e.original.to_lowercase(), e.translation.clone()))
            .collect();
        let now = chrono::Utc::now().to_rfc3339();

        let written = self
            .db
            .transaction_async(move |tx| {
                let mut written = 0;
                for (word, translation) in &entries {
                    written += tx.execute(
                        r#"
                        INSERT INTO vocabulary (word, translation, added_at) VALUES (?1, ?2, ?3)
                        ON CONFLICT(word) DO UPDATE SET translation = excluded.translation
                        "#,
                        params![word, translation, now],
                    )?;
                }
                Ok(written)
            })
            .await?;

        info!("Stored {} vocabulary entries", written);
        Ok(written)
    }
}

#[async_trait]
impl KnownVocabulary for VocabularyStore {
    async fn known_words(&self) -> Result<HashSet<String>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare("SELECT DISTINCT lower(word) FROM vocabulary")?;
                let words = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .filter_map(|r| r.ok())
                    .collect();
                Ok(words)
            })
            .await
    }

    async fn add_words(&self, words: &[String]) -> Result<usize> {
        let words: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        let now = chrono::Utc::now().to_rfc3339();

        let inserted = self
            .db
            .transaction_async(move |tx| {
                let mut inserted = 0;
                for word in &words {
                    inserted += tx.execute(
                        "INSERT OR IGNORE INTO vocabulary (word, added_at) VALUES (?1, ?2)",
                        params![word, now],
                    )?;
                }
                Ok(inserted)
            })
            .await?;

        info!("Added {} new words to vocabulary", inserted);
        Ok(inserted)
    }
}
