use search_core::tokenizer::tokenize;
use search_core::{Extractor, StopWords, TermIndex};

#[test]
fn it_extracts_word_runs() {
    let words: Vec<&str> = tokenize("Rust's state-of-the-art tokenizer_v2, in 2024!").collect();
    assert_eq!(words, vec!["Rust", "state-of-the-art", "tokenizer_v2", "2024"]);
}

#[test]
fn it_handles_unicode_letters() {
    let words: Vec<&str> = tokenize("Café naïve résumé").collect();
    assert_eq!(words, vec!["Café", "naïve", "résumé"]);
}

#[test]
fn it_filters_stopwords_after_extraction() {
    let mut index = TermIndex::new(StopWords::parse("the\nand\n"));
    for word in Extractor::Markdown.extract("The quick brown fox and the lazy dog") {
        index.add_token(&word, 0);
    }
    let terms: Vec<&str> = index.terms().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(terms, vec!["quick", "brown", "fox", "lazy", "dog"]);
}
