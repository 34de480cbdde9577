/*!
 * Core translation service.
 *
 * `Translator` validates a word, consults the result cache, dispatches cache
 * misses to the configured providers in priority order (each call wrapped in
 * the retry policy) and writes successful results back to the cache.
 */

use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::app_config::{Config, ProviderKind};
use crate::errors::AppError;
use crate::language_utils::{is_russian_word, normalize_word};
use crate::providers::TranslationProvider;
use crate::providers::mock::MockProvider;
use crate::providers::openrouter::OpenRouter;

use super::cache::ResultCache;
use super::models::{ResultSource, SkipReason, TranslationResult, WordOutcome};
use super::retry::{BackoffSleeper, RetryPolicy, TokioSleeper};

/// Word translation orchestrator
///
/// Cloning is cheap; clones share providers, cache and sleeper.
#[derive(Debug, Clone)]
pub struct Translator {
    /// Providers in priority order
    providers: Vec<Arc<dyn TranslationProvider>>,

    /// Result cache shared by all providers
    cache: ResultCache,

    /// Retry policy applied to every provider call
    retry_policy: RetryPolicy,

    /// Sleeper used between attempts
    sleeper: Arc<dyn BackoffSleeper>,
}

/// Builder for `Translator`
#[derive(Debug, Default)]
pub struct TranslatorBuilder {
    providers: Vec<Arc<dyn TranslationProvider>>,
    cache: Option<ResultCache>,
    retry_policy: Option<RetryPolicy>,
    sleeper: Option<Arc<dyn BackoffSleeper>>,
}

impl TranslatorBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider; earlier providers take priority
    pub fn provider<P: TranslationProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Use `cache` for results (disabled by default)
    pub fn cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use `policy` for provider calls
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Use `sleeper` between attempts
    pub fn sleeper(mut self, sleeper: Arc<dyn BackoffSleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Build the translator; at least one provider is required
    pub fn build(self) -> Result<Translator, AppError> {
        if self.providers.is_empty() {
            return Err(AppError::Configuration(
                "At least one translation provider is required".to_string(),
            ));
        }

        Ok(Translator {
            providers: self.providers,
            cache: self.cache.unwrap_or_default(),
            retry_policy: self.retry_policy.unwrap_or_default(),
            sleeper: self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper)),
        })
    }
}

impl Translator {
    /// Start building a translator
    pub fn builder() -> TranslatorBuilder {
        TranslatorBuilder::new()
    }

    /// Create a translator from the application configuration
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let translation = &config.translation;
        let mut builder = Self::builder();

        for provider_config in &translation.providers {
            builder = match provider_config.kind {
                ProviderKind::OpenRouter => builder.provider(OpenRouter::from_config(
                    provider_config,
                    &translation.target_language,
                    translation.system_prompt.as_deref(),
                )?),
                ProviderKind::Mock => builder.provider(MockProvider::working()),
            };
        }

        let cache = if config.cache.enabled {
            let path = config.cache.resolved_path()?;
            info!("Using translation cache at {}", path.display());
            ResultCache::new(path)
        } else {
            info!("Translation cache disabled");
            ResultCache::disabled()
        };

        builder
            .cache(cache)
            .retry_policy(RetryPolicy::from_config(&config.retry))
            .build()
    }

    /// Names of the providers in priority order
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// The result cache
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// The retry policy
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Translate a single word
    ///
    /// Returns `None` for words without Cyrillic letters and when every
    /// provider fails.
    pub async fn translate_word(&self, word: &str) -> Option<TranslationResult> {
        self.translate_word_outcome(word).await.into_result()
    }

    /// Translate a single word and report how it ended
    pub async fn translate_word_outcome(&self, word: &str) -> WordOutcome {
        if !is_russian_word(word) {
            warn!("Skipping non-Russian word: '{}'", word);
            return WordOutcome::Skipped(SkipReason::NotRussian);
        }

        let word = normalize_word(word);

        for provider in &self.providers {
            if let Some(result) = self.cache.get(&word, provider.name()).await {
                debug!("Using cached translation for '{}' from '{}'", word, provider.name());
                return WordOutcome::Translated {
                    result,
                    source: ResultSource::Cache(provider.name().to_string()),
                };
            }
        }

        for provider in &self.providers {
            let name = provider.name();
            let attempt = self
                .retry_policy
                .execute(name, self.sleeper.as_ref(), || provider.translate(&word))
                .await;

            match attempt {
                Ok(result) => {
                    self.cache.set(&word, name, &result).await;
                    return WordOutcome::Translated {
                        result,
                        source: ResultSource::Provider(name.to_string()),
                    };
                }
                Err(e) => {
                    error!("Provider '{}' could not translate '{}': {}", name, word, e);
                }
            }
        }

        warn!("All providers failed for '{}', skipping", word);
        WordOutcome::Skipped(SkipReason::AllProvidersFailed)
    }
}
