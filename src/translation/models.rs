/*!
 * Data types shared by the translation engine.
 */

use serde::{Deserialize, Serialize};

/// A structured translation of a single Russian word
///
/// Every field is always present; only `original` is guaranteed to be
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranslationResult {
    /// The normalized word that was translated
    pub original: String,

    /// Translation into the target language (raw model output on fallback)
    #[serde(default)]
    pub translation: String,

    /// Part of speech as reported by the model
    #[serde(default)]
    pub part_of_speech: String,

    /// Grammatical case or other grammar notes
    #[serde(default)]
    pub grammatical_case: String,

    /// Example sentence in Russian, with stress marks
    #[serde(default)]
    pub example_source_language: String,

    /// Example sentence in the target language
    #[serde(default)]
    pub example_target_language: String,
}

impl TranslationResult {
    /// Result built from unparsed model output
    pub fn fallback(word: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            original: word.into(),
            translation: raw_text.into(),
            ..Default::default()
        }
    }

    /// Whether everything but `translation` is empty
    ///
    /// True for raw-text fallbacks, and also for a model reply that carried
    /// nothing but a translation.
    pub fn has_only_translation(&self) -> bool {
        self.part_of_speech.is_empty()
            && self.grammatical_case.is_empty()
            && self.example_source_language.is_empty()
            && self.example_target_language.is_empty()
    }
}

/// Where a successful translation came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSource {
    /// Served from the result cache under the given provider partition
    Cache(String),
    /// Fetched from the named provider
    Provider(String),
}

/// Why a word produced no translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The word contains no Cyrillic letters
    NotRussian,
    /// Every configured provider failed after retries
    AllProvidersFailed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotRussian => write!(f, "not a Russian word"),
            Self::AllProvidersFailed => write!(f, "all providers failed"),
        }
    }
}

/// Terminal state of a single word
#[derive(Debug, Clone, PartialEq)]
pub enum WordOutcome {
    /// The word was translated
    Translated {
        /// The translation
        result: TranslationResult,
        /// Cache or provider that supplied it
        source: ResultSource,
    },
    /// The word was skipped
    Skipped(SkipReason),
}

impl WordOutcome {
    /// Convert into the optional result callers usually want
    pub fn into_result(self) -> Option<TranslationResult> {
        match self {
            Self::Translated { result, .. } => Some(result),
            Self::Skipped(_) => None,
        }
    }
}

/// A word that was attempted in a batch but produced no result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedWord {
    /// The word as scheduled (normalized)
    pub word: String,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Everything a batch run produced
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Successful translations in completion order
    pub results: Vec<TranslationResult>,
    /// Words that yielded no translation
    pub skipped: Vec<SkippedWord>,
}

impl BatchReport {
    /// Number of unique words that were attempted
    pub fn attempted(&self) -> usize {
        self.results.len() + self.skipped.len()
    }
}
