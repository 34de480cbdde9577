/*!
 * # russian-anki - Russian vocabulary translation for flashcards
 *
 * A Rust library that turns Russian words into structured translations
 * (translation, part of speech, grammar notes and example sentences) using
 * LLM providers.
 *
 * ## Features
 *
 * - Translate single words or whole batches with bounded concurrency
 * - Persistent SQLite result cache keyed by word and provider
 * - Exponential-backoff retry and fallback across several providers
 * - Tolerant parsing of model output, including fenced or chatty JSON
 * - Vocabulary store so repeated runs only translate new words
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The translation engine:
 *   - `translation::core`: `Translator` orchestration
 *   - `translation::batch`: Batch processing
 *   - `translation::cache`: Result cache
 *   - `translation::retry`: Retry policy
 * - `providers`: Translation providers:
 *   - `providers::openrouter`: OpenRouter chat-completion client
 *   - `providers::mock`: Scripted provider for tests
 *   - `providers::response`: Model output parsing
 * - `database`: SQLite connection, schema and vocabulary store
 * - `language_utils`: Russian word detection and extraction
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, TranslationError};
pub use language_utils::{extract_words, is_russian_word, normalize_word};
pub use providers::TranslationProvider;
pub use translation::{BatchReport, ResultCache, RetryPolicy, TranslationResult, Translator};
