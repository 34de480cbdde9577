/*!
 * Batch translation processing.
 *
 * This module translates many words at once with bounded concurrency and
 * progress tracking. Each word is an independent future; a failing word
 * never cancels or delays the others.
 */

use futures::stream::{self, StreamExt};
use log::info;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::language_utils::normalize_word;

use super::core::Translator;
use super::models::{BatchReport, SkippedWord, TranslationResult, WordOutcome};

/// Default number of words translated concurrently
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// Batch translator for processing many words with a bounded worker pool
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// The translator to use
    translator: Translator,

    /// Maximum number of words in flight
    max_workers: usize,
}

/// Deduplicate words by their normalized form, keeping first-seen order
pub fn unique_words<I, S>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    words
        .into_iter()
        .map(|w| normalize_word(w.as_ref()))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

impl BatchTranslator {
    /// Create a new batch translator; `max_workers` is at least 1
    pub fn new(translator: Translator, max_workers: usize) -> Self {
        Self {
            translator,
            max_workers: max_workers.max(1),
        }
    }

    /// Maximum number of words in flight
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Translate every unique word, calling `progress_callback(completed, total)`
    /// after each one
    pub async fn translate_all<I, S, F>(&self, words: I, progress_callback: F) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(usize, usize) + Send + Sync,
    {
        let words = unique_words(words);
        let total = words.len();
        if total == 0 {
            return BatchReport::default();
        }

        info!(
            "Translating {} unique words with {} workers",
            total, self.max_workers
        );

        let start_time = Instant::now();
        let completed = AtomicUsize::new(0);
        let translator = &self.translator;
        let completed = &completed;
        let progress_callback = &progress_callback;

        let outcomes: Vec<(String, WordOutcome)> = stream::iter(words)
            .map(|word| async move {
                let outcome = translator.translate_word_outcome(&word).await;
                let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                progress_callback(current, total);
                (word, outcome)
            })
            .buffer_unordered(self.max_workers)
            .collect()
            .await;

        let mut report = BatchReport::default();
        for (word, outcome) in outcomes {
            match outcome {
                WordOutcome::Translated { result, .. } => report.results.push(result),
                WordOutcome::Skipped(reason) => report.skipped.push(SkippedWord { word, reason }),
            }
        }

        info!(
            "Batch finished in {:?}: {} translated, {} skipped",
            start_time.elapsed(),
            report.results.len(),
            report.skipped.len()
        );

        report
    }
}

impl Translator {
    /// Translate many words, returning only the successful results
    ///
    /// Words are deduplicated by their normalized form and results arrive in
    /// completion order.
    pub async fn batch_translate<I, S>(&self, words: I, max_workers: usize) -> Vec<TranslationResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.batch_translate_with_progress(words, max_workers, |_, _| {})
            .await
            .results
    }

    /// Translate many words and report the skipped ones too
    pub async fn batch_translate_with_progress<I, S, F>(
        &self,
        words: I,
        max_workers: usize,
        progress_callback: F,
    ) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(usize, usize) + Send + Sync,
    {
        BatchTranslator::new(self.clone(), max_workers)
            .translate_all(words, progress_callback)
            .await
    }
}
