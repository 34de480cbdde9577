/*!
 * Database module for persistent storage.
 *
 * This module provides SQLite-based persistence for:
 * - The translation result cache, keyed by (word, provider)
 * - The learner's vocabulary of already-known words
 */

pub mod connection;
pub mod schema;
pub mod vocabulary;

// Re-export main types
pub use connection::DatabaseConnection;
pub use vocabulary::{KnownVocabulary, VocabularyStore};
