//! Keyword extraction — turns free text into a deduplicated set of lowercase lemmas.
//!
//! The linguistic model sits behind `LanguageAnalyzer` so extraction can run
//! against the built-in rule-based analyzer or a test double.

use std::collections::{BTreeSet, HashSet};

/// One analyzed token from the input text.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedToken {
    pub text: String,
    pub lemma: String,
    pub is_stop: bool,
    pub is_punct: bool,
}

/// Linguistic analysis capability used by extraction.
pub trait LanguageAnalyzer: Send + Sync {
    /// Named-entity spans, in surface form.
    fn entities(&self, text: &str) -> Vec<String>;

    /// Noun-phrase spans, in surface form.
    fn noun_chunks(&self, text: &str) -> Vec<String>;

    /// Every token in the text, whitespace excluded.
    fn tokens(&self, text: &str) -> Vec<AnalyzedToken>;

    /// Lemma of a single word.
    fn lemmatize(&self, token: &str) -> String;
}

/// Extracts the keyword set for `text`.
///
/// Entities, noun chunks and content-word lemmas are pooled, every phrase is
/// split into single words, and each word is lemmatized again on its own.
/// A phrase like "black forest" therefore contributes "black" and "forest".
pub fn extract_keywords(analyzer: &dyn LanguageAnalyzer, text: &str) -> BTreeSet<String> {
    if text.trim().is_empty() {
        return BTreeSet::new();
    }

    let mut phrases: HashSet<String> = HashSet::new();
    phrases.extend(analyzer.entities(text).iter().map(|e| e.to_lowercase()));
    phrases.extend(analyzer.noun_chunks(text).iter().map(|c| c.to_lowercase()));
    phrases.extend(
        analyzer
            .tokens(text)
            .into_iter()
            .filter(|t| !t.is_stop && !t.is_punct)
            .map(|t| t.lemma.to_lowercase()),
    );

    let words: HashSet<&str> = phrases
        .iter()
        .flat_map(|phrase| phrase.split_whitespace())
        .collect();

    words
        .into_iter()
        .map(|word| analyzer.lemmatize(word).to_lowercase())
        .filter(|lemma| !lemma.is_empty())
        .collect()
}
