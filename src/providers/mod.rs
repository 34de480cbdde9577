/*!
 * Provider implementations for different translation services.
 *
 * This module contains the providers a `Translator` can dispatch words to:
 * - OpenRouter: chat-completion API returning a JSON translation record
 * - Mock: scripted provider for tests and offline runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::translation::models::TranslationResult;

/// Common trait for all translation providers
///
/// Implementations are used as `Arc<dyn TranslationProvider>` and tried in
/// configuration order by the translator.
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Stable identifier, also used as the cache partition key
    fn name(&self) -> &str;

    /// Translate a single word
    ///
    /// # Arguments
    /// * `word` - The normalized Russian word
    ///
    /// # Returns
    /// * `Result<TranslationResult, ProviderError>` - The structured translation or a retryable error
    async fn translate(&self, word: &str) -> Result<TranslationResult, ProviderError>;
}

pub mod mock;
pub mod openrouter;
pub mod response;
