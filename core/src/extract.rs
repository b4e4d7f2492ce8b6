//! Text extraction from document bodies.
//!
//! Both extractors reduce a body to plain text segments and then split those segments into
//! raw words with [`tokenize`]. Nothing is filtered here; normalization and stop-word removal
//! happen in the term index.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use scraper::{ElementRef, Html};
use std::vec;

use crate::tokenizer::tokenize;

/// Elements whose text never reaches the index.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that do not break words apart, e.g. `he<b>ll</b>o` is one word.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark", "q",
    "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

/// The extraction strategy for one document body, chosen by the body's markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    Markdown,
    Html,
}

impl Extractor {
    /// Extract the raw words of `body`, in document order.
    pub fn extract(&self, body: &str) -> Tokens {
        let segments = match self {
            Extractor::Markdown => markdown_segments(body),
            Extractor::Html => html_segments(body),
        };
        Tokens { segments: segments.into_iter(), current: Vec::new().into_iter() }
    }
}

/// A lazy, single-pass sequence of raw words.
///
/// Segments are only split into words as the iterator reaches them.
pub struct Tokens {
    segments: vec::IntoIter<String>,
    current: vec::IntoIter<String>,
}

impl Iterator for Tokens {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(word) = self.current.next() {
                return Some(word);
            }
            let segment = self.segments.next()?;
            self.current = tokenize(&segment).map(str::to_owned).collect::<Vec<_>>().into_iter();
        }
    }
}

fn markdown_segments(source: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut image_depth = 0usize;

    for event in Parser::new(source) {
        match event {
            Event::Start(Tag::Image { .. }) => {
                image_depth += 1;
                flush_segment(&mut segments, &mut current);
            }
            Event::End(TagEnd::Image) => {
                image_depth = image_depth.saturating_sub(1);
                flush_segment(&mut segments, &mut current);
            }
            // Alt text.
            Event::Text(_) | Event::Code(_) if image_depth > 0 => {}
            // The parser may split one run of text into several events.
            Event::Text(text) | Event::Code(text) => current.push_str(&text),
            // Inline markup does not break words, e.g. `un*believ*able` is one word.
            Event::Start(Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. })
            | Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link) => {}
            _ => flush_segment(&mut segments, &mut current),
        }
    }
    flush_segment(&mut segments, &mut current);
    segments
}

fn flush_segment(segments: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        segments.push(std::mem::take(current));
    }
}

fn html_segments(source: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(source);
    let mut text = String::new();
    collect_text(fragment.root_element(), &mut text);
    vec![text]
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            if SKIPPED_ELEMENTS.contains(&name) {
                continue;
            }
            let breaks = !INLINE_ELEMENTS.contains(&name);
            if breaks {
                out.push(' ');
            }
            collect_text(child, out);
            if breaks {
                out.push(' ');
            }
        }
    }
}
