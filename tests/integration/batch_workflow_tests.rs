/*!
 * End-to-end tests for batch translation
 */

use std::collections::HashSet;
use std::time::Duration;

use russian_anki::providers::mock::MockProvider;
use russian_anki::translation::{ResultCache, RetryPolicy, SkipReason, Translator};

use crate::common;

#[tokio::test]
async fn test_batchTranslate_withDuplicates_shouldCallProviderOncePerWord() {
    common::init_logging();
    let provider = MockProvider::working();
    let (translator, _) = common::mock_translator(provider.clone(), RetryPolicy::default());

    let results = translator.batch_translate(["да", "да", "нет"], 5).await;

    assert_eq!(results.len(), 2);
    assert_eq!(provider.request_count(), 2);
    assert_eq!(translator.cache().stats().writes, 2);
    assert_eq!(translator.cache().len().await, 2);
}

#[tokio::test]
async fn test_batchTranslate_withRepeatedWordAcrossRuns_shouldHitCache() {
    let provider = MockProvider::working();
    let (translator, _) = common::mock_translator(provider.clone(), RetryPolicy::default());

    let first = translator.batch_translate(["собака"], 5).await;
    let second = translator.batch_translate(["собака"], 5).await;

    assert_eq!(provider.request_count(), 1);
    assert_eq!(first, second);
    assert_eq!(translator.cache().stats().hits, 1);
}

#[tokio::test]
async fn test_batchTranslate_withTransientFailures_shouldRetryAndSucceed() {
    let provider = MockProvider::fail_times(2);
    let (translator, sleeper) = common::mock_translator(
        provider.clone(),
        RetryPolicy::new(3, Duration::from_secs(2), 2.0),
    );

    let results = translator.batch_translate(["кот"], 5).await;

    assert_eq!(results.len(), 1);
    assert_eq!(provider.requests_for("кот"), 3);
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_secs(2), Duration::from_secs(4)]
    );
}

#[tokio::test]
async fn test_batchTranslate_withFailingProvider_shouldGiveUpAndContinue() {
    let failing = MockProvider::failing();
    let (translator, sleeper) = common::mock_translator(failing.clone(), RetryPolicy::default());

    let report = translator
        .batch_translate_with_progress(["кот", "hello"], 2, |_, _| {})
        .await;

    assert!(report.results.is_empty());
    assert_eq!(failing.requests_for("кот"), 3);
    assert_eq!(sleeper.delays().len(), 2);
    assert_eq!(report.skipped.len(), 2);
    assert!(report
        .skipped
        .iter()
        .any(|s| s.word == "кот" && s.reason == SkipReason::AllProvidersFailed));
}

#[tokio::test]
async fn test_batchTranslate_withMalformedResponse_shouldReturnFallback() {
    let provider = MockProvider::raw_response("Conclusion: привет means hello");
    let (translator, _) = common::mock_translator(provider, RetryPolicy::default());

    let results = translator.batch_translate(["привет"], 5).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].original, "привет");
    assert_eq!(results[0].translation, "Conclusion: привет means hello");
    assert!(results[0].has_only_translation());
}

#[tokio::test]
async fn test_translateWord_withNonRussianWord_shouldTouchNothing() {
    let provider = MockProvider::working();
    let (translator, _) = common::mock_translator(provider.clone(), RetryPolicy::default());

    assert!(translator.translate_word("hello").await.is_none());
    assert_eq!(provider.request_count(), 0);
    assert_eq!(translator.cache().stats().accesses(), 0);
}

#[tokio::test]
async fn test_batchTranslateWithProgress_shouldAccountForEveryUniqueWord() {
    let provider = MockProvider::intermittent(4);
    let translator = Translator::builder()
        .provider(provider)
        .cache(ResultCache::in_memory())
        .retry_policy(RetryPolicy::no_retry())
        .build()
        .unwrap();

    let words = [
        "один", "два", "три", "четыре", "пять", "шесть", "семь", "восемь", "two", "Один",
    ];
    let report = translator
        .batch_translate_with_progress(words, 3, |_, _| {})
        .await;

    assert_eq!(report.attempted(), 9);
    let seen: HashSet<String> = report
        .results
        .iter()
        .map(|r| r.original.clone())
        .chain(report.skipped.iter().map(|s| s.word.clone()))
        .collect();
    assert_eq!(seen.len(), 9);
}

#[tokio::test]
async fn test_batchTranslate_withSlowProvider_shouldRunWordsConcurrently() {
    let provider = MockProvider::slow(200);
    let (translator, _) = common::mock_translator(provider.clone(), RetryPolicy::default());

    let words: Vec<String> = ["а", "б", "в", "г", "д"].iter().map(|w| w.to_string()).collect();
    let start = std::time::Instant::now();
    let results = translator.batch_translate(&words, 5).await;

    assert_eq!(results.len(), 5);
    assert!(start.elapsed() < Duration::from_millis(900));
}

#[tokio::test]
async fn test_batchTranslate_withUnusableCache_shouldStillTranslateEveryWord() {
    let dir = common::create_temp_dir().unwrap();
    let blocker = common::create_test_file(dir.path(), "not-a-directory", "plain file").unwrap();
    let provider = MockProvider::working();
    let translator = Translator::builder()
        .provider(provider.clone())
        .cache(ResultCache::new(blocker.join("translation_cache.db")))
        .build()
        .unwrap();

    let results = translator.batch_translate(["да", "нет", "да"], 2).await;

    let mut originals: Vec<String> = results.iter().map(|r| r.original.clone()).collect();
    originals.sort();
    assert_eq!(originals, vec!["да".to_string(), "нет".to_string()]);
    assert_eq!(provider.request_count(), 2);

    let stats = translator.cache().stats();
    assert_eq!(stats.writes, 0);
    assert!(stats.errors > 0);
}
