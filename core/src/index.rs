use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::registry::DocId;

pub type TermId = usize;

pub const MIN_TERM_LEN: usize = 3;
pub const MAX_TERM_LEN: usize = 20;

/// How many times a term occurs in one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub document: DocId,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub text: String,
    /// At most one entry per document, in the order documents were first seen.
    pub occurrences: Vec<Occurrence>,
}

/// Words that are never indexed.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a newline-delimited list. Blank lines and lines starting with `#` are ignored.
    pub fn parse(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for StopWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let words = iter.into_iter().map(|w| w.as_ref().trim().to_lowercase()).collect();
        Self { words }
    }
}

/// Per-term document occurrences, keyed by normalized term text.
#[derive(Debug)]
pub struct TermIndex {
    stop_words: StopWords,
    min_len: usize,
    max_len: usize,
    dictionary: HashMap<String, TermId>,
    terms: Vec<Term>,
}

impl TermIndex {
    pub fn new(stop_words: StopWords) -> Self {
        Self::with_length_bounds(stop_words, MIN_TERM_LEN, MAX_TERM_LEN)
    }

    pub fn with_length_bounds(stop_words: StopWords, min_len: usize, max_len: usize) -> Self {
        Self { stop_words, min_len, max_len, dictionary: HashMap::new(), terms: Vec::new() }
    }

    /// Lower-case and trim a raw token, or `None` if it should not be indexed.
    ///
    /// Length is counted in code points.
    pub fn normalize(&self, token: &str) -> Option<String> {
        let text = token.trim().to_lowercase();
        let len = text.chars().count();
        if len < self.min_len || len > self.max_len || self.stop_words.contains(&text) {
            return None;
        }
        Some(text)
    }

    pub fn get_or_create_term(&mut self, text: String) -> TermId {
        if let Some(&id) = self.dictionary.get(&text) {
            return id;
        }
        let id = self.terms.len();
        self.terms.push(Term { text: text.clone(), occurrences: Vec::new() });
        self.dictionary.insert(text, id);
        id
    }

    /// Count one more occurrence of `term` in `document`.
    pub fn record_occurrence(&mut self, term: TermId, document: DocId) {
        let occurrences = &mut self.terms[term].occurrences;
        // Documents are usually fed in order, so the match is almost always the last entry.
        match occurrences.iter_mut().rev().find(|o| o.document == document) {
            Some(occurrence) => occurrence.count += 1,
            None => occurrences.push(Occurrence { document, count: 1 }),
        }
    }

    /// Normalize `token` and, if it survives, record it against `document`.
    pub fn add_token(&mut self, token: &str, document: DocId) -> Option<TermId> {
        let text = self.normalize(token)?;
        let id = self.get_or_create_term(text);
        self.record_occurrence(id, document);
        Some(id)
    }

    pub fn term(&self, id: TermId) -> &Term {
        &self.terms[id]
    }

    pub fn get(&self, text: &str) -> Option<&Term> {
        self.dictionary.get(text).map(|&id| &self.terms[id])
    }

    /// Terms in discovery order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn total_occurrences(&self) -> u64 {
        self.terms.iter().flat_map(|t| &t.occurrences).map(|o| u64::from(o.count)).sum()
    }

    pub fn into_terms(self) -> Vec<Term> {
        self.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_length_boundaries() {
        let index = TermIndex::new(StopWords::empty());
        assert_eq!(index.normalize("ab"), None);
        assert_eq!(index.normalize("Cat"), Some("cat".to_string()));
        assert_eq!(index.normalize("  Padded  "), Some("padded".to_string()));
        let twenty = "a".repeat(20);
        assert_eq!(index.normalize(&twenty), Some(twenty.clone()));
        assert_eq!(index.normalize(&"a".repeat(21)), None);
    }

    #[test]
    fn length_counts_code_points_not_bytes() {
        let index = TermIndex::new(StopWords::empty());
        // 3 code points, 6 bytes
        assert_eq!(index.normalize("ééé"), Some("ééé".to_string()));
        assert_eq!(index.normalize(&"é".repeat(20)), Some("é".repeat(20)));
    }

    #[test]
    fn stop_words_are_never_terms() {
        let mut index = TermIndex::new(StopWords::parse("# common words\nthe\n\n  and  \nWITH\n"));
        assert_eq!(index.add_token("The", 0), None);
        assert_eq!(index.add_token("and", 0), None);
        assert_eq!(index.add_token("with", 0), None);
        assert!(index.add_token("cat", 0).is_some());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn stop_word_file_ignores_comments_and_blanks() {
        let stop = StopWords::parse("#the\n\n   \nfoo\n# bar\n");
        assert_eq!(stop.len(), 1);
        assert!(stop.contains("foo"));
        assert!(!stop.contains("#the"));
    }

    #[test]
    fn repeated_occurrences_aggregate() {
        let mut index = TermIndex::new(StopWords::empty());
        index.add_token("cat", 1);
        index.add_token("CAT", 1);
        assert_eq!(index.get("cat").unwrap().occurrences, vec![Occurrence { document: 1, count: 2 }]);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let mut index = TermIndex::new(StopWords::empty());
        let id = index.get_or_create_term("cat".into());
        for doc in [0, 1, 0, 2, 1, 0] {
            index.record_occurrence(id, doc);
        }
        let mut occ = index.term(id).occurrences.clone();
        occ.sort_by_key(|o| o.document);
        assert_eq!(
            occ,
            vec![
                Occurrence { document: 0, count: 3 },
                Occurrence { document: 1, count: 2 },
                Occurrence { document: 2, count: 1 },
            ]
        );
        assert_eq!(index.total_occurrences(), 6);
    }

    #[test]
    fn get_or_create_returns_existing_term() {
        let mut index = TermIndex::new(StopWords::empty());
        let a = index.get_or_create_term("dog".into());
        let b = index.get_or_create_term("dog".into());
        assert_eq!(a, b);
        assert_eq!(index.len(), 1);
    }
}
