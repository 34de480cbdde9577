/*!
 * Parsing of model output into translation results.
 *
 * Models are asked for a bare JSON object but regularly wrap it in code
 * fences or surround it with prose. Parsing never fails: when no JSON
 * object can be recovered the raw text becomes the translation.
 */

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::translation::models::TranslationResult;

/// Accepted key spellings for each canonical field, canonical name first
const TRANSLATION_KEYS: &[&str] = &["translation"];
const PART_OF_SPEECH_KEYS: &[&str] = &["part_of_speech", "part of speech", "partOfSpeech"];
const GRAMMATICAL_CASE_KEYS: &[&str] = &[
    "grammatical_case",
    "grammatical case",
    "grammar_info",
    "case",
];
const EXAMPLE_SOURCE_KEYS: &[&str] = &["example_source_language", "example_ru", "example_source"];
const EXAMPLE_TARGET_KEYS: &[&str] = &["example_target_language", "example_de", "example_target"];

/// Turn a model response into a translation result for `word`
///
/// Tries, in order: the text from the first `{` onward, the text with a
/// surrounding triple-backtick fence removed, and the span between the first
/// `{` and the last `}`. Falls back to the raw text.
pub fn parse_translation_response(word: &str, content: &str) -> TranslationResult {
    let content = content.trim();

    if let Some(start) = content.find('{') {
        if let Some(result) = parse_object(word, &content[start..]) {
            return result;
        }
    }

    let unfenced = strip_code_fence(content);
    if let Some(result) = parse_object(word, unfenced) {
        debug!("Parsed fenced JSON response for '{}'", word);
        return result;
    }

    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if end > start {
            if let Some(result) = parse_object(word, &content[start..=end]) {
                debug!("Parsed embedded JSON response for '{}'", word);
                return result;
            }
        }
    }

    warn!(
        "Could not parse JSON from response for '{}', keeping raw text",
        word
    );
    TranslationResult::fallback(word, content)
}

/// Remove a leading ```` ``` ```` / ```` ```json ```` fence and a trailing ```` ``` ````
pub fn strip_code_fence(content: &str) -> &str {
    let mut text = content.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    let text = text.trim();
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn parse_object(word: &str, text: &str) -> Option<TranslationResult> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(normalize_fields(word, &map)),
        _ => None,
    }
}

/// Map a parsed JSON object onto the canonical result schema
pub fn normalize_fields(word: &str, map: &Map<String, Value>) -> TranslationResult {
    TranslationResult {
        original: word.to_string(),
        translation: pick(map, TRANSLATION_KEYS),
        part_of_speech: pick(map, PART_OF_SPEECH_KEYS),
        grammatical_case: pick(map, GRAMMATICAL_CASE_KEYS),
        example_source_language: pick(map, EXAMPLE_SOURCE_KEYS),
        example_target_language: pick(map, EXAMPLE_TARGET_KEYS),
    }
}

fn pick(map: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| map.get(*key))
        .map(value_to_text)
        .unwrap_or_default()
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
