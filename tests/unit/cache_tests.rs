/*!
 * Tests for the translation result cache
 */

use russian_anki::translation::{ResultCache, TranslationResult};

use crate::common;

fn entry(word: &str) -> TranslationResult {
    TranslationResult {
        original: word.to_string(),
        translation: "Hund".to_string(),
        part_of_speech: "Substantiv".to_string(),
        grammatical_case: "Nominativ".to_string(),
        example_source_language: "Это моя́ соба́ка.".to_string(),
        example_target_language: "Das ist mein Hund.".to_string(),
    }
}

#[tokio::test]
async fn test_cache_withFile_shouldPersistAcrossInstances() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("nested").join("translation_cache.db");

    let first = ResultCache::new(&path);
    first.set("собака", "openrouter", &entry("собака")).await;
    drop(first);

    let second = ResultCache::new(&path);
    assert_eq!(second.get("собака", "openrouter").await, Some(entry("собака")));
    assert!(path.exists());
}

#[tokio::test]
async fn test_cache_clones_shouldShareStorageAndStats() {
    let cache = ResultCache::in_memory();
    let clone = cache.clone();

    clone.set("собака", "openrouter", &entry("собака")).await;

    assert!(cache.get("собака", "openrouter").await.is_some());
    assert_eq!(cache.stats().writes, 1);
    assert_eq!(clone.stats().hits, 1);
}

#[tokio::test]
async fn test_cache_withCorruptEntry_shouldDegradeToMiss() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("cache.db");

    let cache = ResultCache::new(&path);
    cache.set("собака", "openrouter", &entry("собака")).await;

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute("UPDATE translations SET result = 'not json'", [])
        .unwrap();
    drop(conn);

    assert!(cache.get("собака", "openrouter").await.is_none());
    assert_eq!(cache.stats().errors, 1);
    assert_eq!(cache.stats().misses, 1);
}

#[tokio::test]
async fn test_cache_storedJson_shouldUseCanonicalKeys() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("cache.db");

    let cache = ResultCache::new(&path);
    cache.set("Собака", "openrouter", &entry("собака")).await;

    let conn = rusqlite::Connection::open(&path).unwrap();
    let (word, json): (String, String) = conn
        .query_row("SELECT word, result FROM translations", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(word, "собака");
    assert_eq!(value.as_object().unwrap().len(), 6);
    assert_eq!(value["grammatical_case"], "Nominativ");
}

#[tokio::test]
async fn test_cache_len_shouldCountEntriesPerProvider() {
    let cache = ResultCache::in_memory();
    assert!(cache.is_empty().await);

    cache.set("собака", "openrouter", &entry("собака")).await;
    cache.set("собака", "mock", &entry("собака")).await;

    assert_eq!(cache.len().await, 2);
}
