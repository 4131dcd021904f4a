use serde::{Deserialize, Serialize};

use crate::models::{CategoryTable, TxnKind, OTHER};

const MIN_LEARNED_WORD_LEN: usize = 3;

/// Word to category mappings learned from user corrections, shared by all
/// users. Kept in first-insertion order; a later correction for the same
/// word overwrites the category in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearnedPatterns {
    patterns: Vec<(String, String)>,
}

impl LearnedPatterns {
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, word: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(w, _)| w == word)
            .map(|(_, c)| c.as_str())
    }

    /// Insert or overwrite a mapping. Returns true if anything changed.
    pub fn insert(&mut self, word: &str, category: &str) -> bool {
        let word = word.to_lowercase();
        if let Some(entry) = self.patterns.iter_mut().find(|(w, _)| *w == word) {
            if entry.1 == category {
                return false;
            }
            entry.1 = category.to_string();
            return true;
        }
        self.patterns.push((word, category.to_string()));
        true
    }

    /// First learned word contained in `text_lower`.
    fn lookup(&self, text_lower: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(w, _)| text_lower.contains(w.as_str()))
            .map(|(_, c)| c.as_str())
    }
}

/// Suggests a category for expense text: learned words first, then the
/// user's keyword table, then `Other`.
pub(crate) struct Categorizer<'a> {
    learned: &'a LearnedPatterns,
    table: &'a CategoryTable,
}

impl<'a> Categorizer<'a> {
    pub(crate) fn new(learned: &'a LearnedPatterns, table: &'a CategoryTable) -> Self {
        Self { learned, table }
    }

    pub(crate) fn categorize(&self, text: &str) -> String {
        let text_lower = text.to_lowercase();

        if let Some(category) = self.learned.lookup(&text_lower) {
            return category.to_string();
        }

        for category in self.table.categories() {
            if category.name == OTHER {
                continue;
            }
            if category
                .keywords
                .iter()
                .any(|k| !k.is_empty() && text_lower.contains(k.as_str()))
            {
                return category.name.clone();
            }
        }

        OTHER.to_string()
    }
}

/// Alphabetic tokens of at least three letters, lowercased, deduplicated.
pub(crate) fn learnable_words(text: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for token in text.split(|c: char| !c.is_alphabetic()) {
        if token.chars().count() < MIN_LEARNED_WORD_LEN {
            continue;
        }
        let lower = token.to_lowercase();
        if !words.contains(&lower) {
            words.push(lower);
        }
    }
    words
}

/// Record a user's override of a suggested category. Only expenses learn,
/// and only when the confirmed category differs from the suggestion.
/// Returns the number of mappings that changed.
pub(crate) fn learn_from_override(
    learned: &mut LearnedPatterns,
    kind: TxnKind,
    raw_text: &str,
    suggested: &str,
    confirmed: &str,
) -> usize {
    if kind != TxnKind::Expense || suggested.eq_ignore_ascii_case(confirmed) {
        return 0;
    }
    learnable_words(raw_text)
        .iter()
        .filter(|w| learned.insert(w, confirmed))
        .count()
}
