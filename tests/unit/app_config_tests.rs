/*!
 * Tests for application configuration loading and validation
 */

use russian_anki::app_config::{Config, LogLevel, ProviderConfig, ProviderKind};
use russian_anki::errors::AppError;

use crate::common;

#[test]
fn test_load_withFullConfig_shouldReadEverySection() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "translation": {
                "target_language": "English",
                "providers": [
                    {"type": "openrouter", "model": "meta/llama", "api_key": "abc", "timeout_secs": 10},
                    {"type": "mock"}
                ],
                "system_prompt": "Translate into {target_language}."
            },
            "retry": {"max_retries": 5, "initial_backoff_ms": 100, "backoff_factor": 3.0},
            "batch": {"max_workers": 8},
            "cache": {"enabled": false, "path": "/tmp/cache.db"},
            "log_level": "debug"
        }"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.translation.target_language, "English");
    assert_eq!(config.translation.providers.len(), 2);
    assert_eq!(config.translation.providers[0].model, "meta/llama");
    assert_eq!(config.translation.providers[0].timeout_secs, 10);
    assert_eq!(config.translation.providers[1].kind, ProviderKind::Mock);
    assert_eq!(config.retry.max_retries, 5);
    assert_eq!(config.retry.backoff_factor, 3.0);
    assert_eq!(config.batch.max_workers, 8);
    assert!(!config.cache.enabled);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate_with_env_key(None).is_ok());
}

#[test]
fn test_load_withInvalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();

    let error = Config::load(&path).unwrap_err();
    assert!(error.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_save_thenLoad_shouldPreserveValues() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.translation.override_model("some/model");
    config.batch.max_workers = 2;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.translation.providers[0].model, "some/model");
    assert_eq!(loaded.batch.max_workers, 2);
}

#[test]
fn test_validate_withMockOnly_shouldNotNeedApiKey() {
    let mut config = Config::default();
    config.translation.providers = vec![ProviderConfig::new(ProviderKind::Mock)];

    assert!(config.validate_with_env_key(None).is_ok());
}

#[test]
fn test_validate_withZeroRetries_shouldReportConfigurationError() {
    let mut config = Config::default();
    config.retry.max_retries = 0;

    match config.validate_with_env_key(Some("key".to_string())) {
        Err(AppError::Configuration(message)) => assert!(message.contains("max_retries")),
        other => panic!("Expected configuration error, got {:?}", other),
    }
}

#[test]
fn test_overrideModel_shouldLeaveMockUntouched() {
    let mut config = Config::default();
    config.translation.providers.push(ProviderConfig::new(ProviderKind::Mock));

    config.translation.override_model("new/model");

    assert_eq!(config.translation.providers[0].model, "new/model");
    assert_eq!(config.translation.providers[1].model, "");
}

#[test]
fn test_logLevel_toLevelFilter_shouldMatch() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
}
