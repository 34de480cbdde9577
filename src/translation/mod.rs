/*!
 * Word translation engine.
 *
 * This module contains the orchestration that turns Russian words into
 * structured translations. It is split into several submodules:
 *
 * - `core`: The `Translator` and its per-word state machine
 * - `batch`: Bounded-concurrency batch processing
 * - `cache`: SQLite-backed result cache
 * - `retry`: Exponential-backoff retry policy
 * - `models`: Result and outcome types
 */

// Re-export main types for easier usage
pub use self::batch::BatchTranslator;
pub use self::cache::{CacheStats, ResultCache};
pub use self::core::{Translator, TranslatorBuilder};
pub use self::models::{BatchReport, ResultSource, SkipReason, SkippedWord, TranslationResult, WordOutcome};
pub use self::retry::{BackoffSleeper, RecordingSleeper, RetryPolicy, TokioSleeper};

// Submodules
pub mod batch;
pub mod cache;
pub mod core;
pub mod models;
pub mod retry;
