/*!
 * Integration tests for the OpenRouter client against a local HTTP stub
 */

use std::sync::Arc;
use std::time::Duration;

use russian_anki::errors::ProviderError;
use russian_anki::providers::TranslationProvider;
use russian_anki::providers::openrouter::OpenRouter;
use russian_anki::translation::{RecordingSleeper, ResultCache, RetryPolicy, Translator};

use crate::common::{self, StubResponse, StubServer};

fn client(server: &StubServer, timeout_secs: u64) -> OpenRouter {
    OpenRouter::new("test-key", &server.base_url, "test/model", timeout_secs)
        .expect("Failed to create OpenRouter client")
}

#[tokio::test]
async fn test_translate_withFencedJson_shouldParseResult() {
    common::init_logging();
    let server = StubServer::start(vec![StubResponse::completion(
        "```json\n{\"translation\": \"Buch\", \"part_of_speech\": \"Substantiv\", \"grammatical case\": \"Nominativ\", \"example_ru\": \"Э́то кни́га.\", \"example_de\": \"Das ist ein Buch.\"}\n```",
    )])
    .await;

    let result = client(&server, 5).translate("книга").await.unwrap();

    assert_eq!(result.original, "книга");
    assert_eq!(result.translation, "Buch");
    assert_eq!(result.grammatical_case, "Nominativ");
    assert_eq!(result.example_target_language, "Das ist ein Buch.");
}

#[tokio::test]
async fn test_translate_shouldSendHeadersAndMessages() {
    let server = StubServer::start(vec![StubResponse::completion("{\"translation\": \"ja\"}")]).await;

    client(&server, 5).translate("да").await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    let lowered = request.to_lowercase();
    assert!(request.starts_with("POST /api/v1/chat/completions"));
    assert!(lowered.contains("authorization: bearer test-key"));
    assert!(lowered.contains("http-referer:"));
    assert!(lowered.contains("x-title: russian-anki-translator"));

    let body_start = request.find("\r\n\r\n").unwrap() + 4;
    let body: serde_json::Value = serde_json::from_str(&request[body_start..]).unwrap();
    assert_eq!(body["model"], "test/model");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "Russian word: да");
}

#[tokio::test]
async fn test_translate_withServerError_shouldReturnApiError() {
    let server = StubServer::start(vec![StubResponse::status(500, "boom")]).await;

    let error = client(&server, 5).translate("да").await.unwrap_err();

    match error {
        ProviderError::ApiError { status_code, message } => {
            assert_eq!(status_code, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("Expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_translate_withUnauthorized_shouldReturnAuthenticationError() {
    let server = StubServer::start(vec![StubResponse::status(401, "bad key")]).await;

    let error = client(&server, 5).translate("да").await.unwrap_err();

    assert!(matches!(error, ProviderError::AuthenticationError(_)));
}

#[tokio::test]
async fn test_translate_withInvalidEnvelope_shouldReturnParseError() {
    let server = StubServer::start(vec![StubResponse::ok("<html>oops</html>")]).await;

    let error = client(&server, 5).translate("да").await.unwrap_err();

    assert!(matches!(error, ProviderError::ParseError(_)));
}

#[tokio::test]
async fn test_translate_withSilentServer_shouldTimeOut() {
    let server = StubServer::start_silent().await;

    let error = client(&server, 1).translate("да").await.unwrap_err();

    assert!(matches!(error, ProviderError::Timeout(1)));
}

#[tokio::test]
async fn test_translator_withFlakyServer_shouldRetryThenCache() {
    let server = StubServer::start(vec![
        StubResponse::status(503, "busy"),
        StubResponse::completion("{\"translation\": \"nein\"}"),
    ])
    .await;
    let sleeper = Arc::new(RecordingSleeper::new());
    let translator = Translator::builder()
        .provider(client(&server, 5))
        .cache(ResultCache::in_memory())
        .retry_policy(RetryPolicy::new(3, Duration::from_secs(2), 2.0))
        .sleeper(sleeper.clone())
        .build()
        .unwrap();

    let first = translator.translate_word("нет").await.unwrap();
    let second = translator.translate_word("нет").await.unwrap();

    assert_eq!(first.translation, "nein");
    assert_eq!(first, second);
    assert_eq!(server.request_count(), 2);
    assert_eq!(sleeper.delays(), vec![Duration::from_secs(2)]);
}

#[tokio::test]
async fn test_translator_withFailingServer_shouldStopAfterThreeAttempts() {
    let server = StubServer::start(vec![StubResponse::status(500, "down")]).await;
    let translator = Translator::builder()
        .provider(client(&server, 5))
        .cache(ResultCache::in_memory())
        .sleeper(Arc::new(RecordingSleeper::new()))
        .build()
        .unwrap();

    assert!(translator.translate_word("нет").await.is_none());
    assert_eq!(server.request_count(), 3);
    assert_eq!(translator.cache().stats().writes, 0);
}
