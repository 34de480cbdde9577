/*!
 * Tests for the translator orchestration
 */

use std::sync::Arc;
use std::time::Duration;

use russian_anki::providers::mock::MockProvider;
use russian_anki::translation::{
    RecordingSleeper, ResultCache, ResultSource, RetryPolicy, SkipReason, Translator, WordOutcome,
};

use crate::common;

#[tokio::test]
async fn test_translateWord_withCacheHitInSecondPartition_shouldSkipAllProviders() {
    common::init_logging();
    let cache = ResultCache::in_memory();
    let primary = MockProvider::working().with_name("primary");
    let secondary = MockProvider::working().with_name("secondary");

    cache
        .set("дом", "secondary", &MockProvider::expected_result("дом"))
        .await;

    let translator = Translator::builder()
        .provider(primary.clone())
        .provider(secondary.clone())
        .cache(cache)
        .build()
        .unwrap();

    let outcome = translator.translate_word_outcome("дом").await;

    assert!(matches!(
        outcome,
        WordOutcome::Translated { source: ResultSource::Cache(ref name), .. } if name == "secondary"
    ));
    assert_eq!(primary.request_count(), 0);
    assert_eq!(secondary.request_count(), 0);
}

#[tokio::test]
async fn test_translateWord_withFallbackResponse_shouldCacheIt() {
    let provider = MockProvider::raw_response("I am not sure what you mean");
    let (translator, _) = common::mock_translator(provider.clone(), RetryPolicy::default());

    let first = translator.translate_word("дом").await.unwrap();
    let second = translator.translate_word("дом").await.unwrap();

    assert!(first.has_only_translation());
    assert_eq!(first, second);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translateWord_withRetryPolicy_shouldGrowBackoffByFactor() {
    let provider = MockProvider::fail_times(3);
    let (translator, sleeper) = common::mock_translator(
        provider.clone(),
        RetryPolicy::new(4, Duration::from_secs(1), 3.0),
    );

    assert!(translator.translate_word("дом").await.is_some());
    assert_eq!(
        sleeper.delays(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(3),
            Duration::from_secs(9)
        ]
    );
    assert_eq!(provider.requests_for("дом"), 4);
}

#[tokio::test]
async fn test_translateWord_withSharedSleeper_shouldResetBackoffPerWord() {
    let sleeper = Arc::new(RecordingSleeper::new());
    let translator = Translator::builder()
        .provider(MockProvider::fail_times(1))
        .retry_policy(RetryPolicy::new(3, Duration::from_secs(1), 2.0))
        .sleeper(sleeper.clone())
        .build()
        .unwrap();

    translator.translate_word("да").await.unwrap();
    translator.translate_word("нет").await.unwrap();

    assert_eq!(sleeper.delays(), vec![Duration::from_secs(1), Duration::from_secs(1)]);
}

#[tokio::test]
async fn test_translateWordOutcome_withEmptyInput_shouldBeNotRussian() {
    let (translator, _) = common::mock_translator(MockProvider::working(), RetryPolicy::default());

    assert_eq!(
        translator.translate_word_outcome("   ").await,
        WordOutcome::Skipped(SkipReason::NotRussian)
    );
}

#[tokio::test]
async fn test_translator_withDisabledCache_shouldCallProviderEveryTime() {
    let provider = MockProvider::working();
    let translator = Translator::builder()
        .provider(provider.clone())
        .build()
        .unwrap();

    translator.translate_word("дом").await.unwrap();
    translator.translate_word("дом").await.unwrap();

    assert_eq!(provider.request_count(), 2);
    assert!(!translator.cache().is_enabled());
}
