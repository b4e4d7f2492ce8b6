use serde::Serialize;

use crate::encoder::{self, EncodeStats};
use crate::error::EncodeError;
use crate::index::{StopWords, TermIndex, MAX_TERM_LEN, MIN_TERM_LEN};
use crate::registry::{DocId, DocumentRegistry};
use crate::source::SourceDocument;
use crate::trie::Trie;

pub const DEFAULT_SEARCHABLE_TAG: &str = "#searchable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Pages are only indexed when they carry this tag. Posts are always indexed.
    pub searchable_tag: String,
    pub min_term_len: usize,
    pub max_term_len: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            searchable_tag: DEFAULT_SEARCHABLE_TAG.to_string(),
            min_term_len: MIN_TERM_LEN,
            max_term_len: MAX_TERM_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub documents: usize,
    pub filtered: usize,
    pub terms: usize,
    pub occurrences: u64,
    pub trie_nodes: usize,
    pub bytes: usize,
}

pub struct CompiledIndex {
    pub bytes: Vec<u8>,
    pub stats: BuildStats,
    pub encode_stats: EncodeStats,
}

/// Batch compiler: documents in, one artifact out.
pub struct IndexCompiler {
    config: CompilerConfig,
    registry: DocumentRegistry,
    index: TermIndex,
    filtered: usize,
}

impl IndexCompiler {
    pub fn new(config: CompilerConfig, stop_words: StopWords) -> Self {
        let index = TermIndex::with_length_bounds(stop_words, config.min_term_len, config.max_term_len);
        Self { config, registry: DocumentRegistry::new(), index, filtered: 0 }
    }

    pub fn is_searchable(&self, doc: &SourceDocument) -> bool {
        !doc.is_page || doc.tags.contains(&self.config.searchable_tag)
    }

    /// Register `doc` and index its words. Returns `None` if the tag filter rejects it.
    pub fn add_document(&mut self, doc: &SourceDocument) -> Result<Option<DocId>, EncodeError> {
        if !self.is_searchable(doc) {
            tracing::debug!(title = %doc.title, "page is not tagged searchable");
            self.filtered += 1;
            return Ok(None);
        }

        let id = self.registry.register(doc.is_page, doc.title.as_str(), doc.url.as_str())?;
        let mut tokens = 0usize;
        for word in doc.format.extract(&doc.body) {
            tokens += 1;
            self.index.add_token(&word, id);
        }
        tracing::debug!(id, title = %doc.title, tokens, "indexed document");
        Ok(Some(id))
    }

    /// Add documents in the order given; that order fixes document ids.
    pub fn add_documents<'a>(
        &mut self,
        docs: impl IntoIterator<Item = &'a SourceDocument>,
    ) -> Result<(), EncodeError> {
        for doc in docs {
            self.add_document(doc)?;
        }
        Ok(())
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn index(&self) -> &TermIndex {
        &self.index
    }

    /// Build the trie and encode the artifact.
    pub fn compile(self) -> Result<CompiledIndex, EncodeError> {
        let terms = self.index.len();
        let occurrences = self.index.total_occurrences();
        let trie = Trie::from_terms(self.index.into_terms());
        let (bytes, encode_stats) = encoder::encode(self.registry.all_documents(), &trie)?;

        let stats = BuildStats {
            documents: self.registry.len(),
            filtered: self.filtered,
            terms,
            occurrences,
            trie_nodes: encode_stats.nodes,
            bytes: bytes.len(),
        };
        tracing::info!(
            documents = stats.documents,
            filtered = stats.filtered,
            terms = stats.terms,
            occurrences = stats.occurrences,
            trie_nodes = stats.trie_nodes,
            size_kb = stats.bytes as f64 / 1024.0,
            "compiled search index"
        );
        Ok(CompiledIndex { bytes, stats, encode_stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extractor;

    fn page(tags: &[&str]) -> SourceDocument {
        SourceDocument {
            is_page: true,
            title: "About".into(),
            url: "about".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            body: "unique pagewords".into(),
            format: Extractor::Markdown,
        }
    }

    #[test]
    fn untagged_pages_contribute_nothing() {
        let mut compiler = IndexCompiler::new(CompilerConfig::default(), StopWords::empty());
        assert_eq!(compiler.add_document(&page(&["misc"])), Ok(None));
        assert!(compiler.registry().is_empty());
        assert!(compiler.index().is_empty());

        assert_eq!(compiler.add_document(&page(&["#searchable"])), Ok(Some(0)));
        assert_eq!(compiler.index().len(), 2);
    }

    #[test]
    fn posts_ignore_tags() {
        let mut compiler = IndexCompiler::new(CompilerConfig::default(), StopWords::empty());
        let post = SourceDocument { is_page: false, tags: Default::default(), ..page(&[]) };
        assert_eq!(compiler.add_document(&post), Ok(Some(0)));
    }

    #[test]
    fn custom_searchable_tag() {
        let config = CompilerConfig { searchable_tag: "search".into(), ..CompilerConfig::default() };
        let mut compiler = IndexCompiler::new(config, StopWords::empty());
        assert_eq!(compiler.add_document(&page(&["#searchable"])), Ok(None));
        assert_eq!(compiler.add_document(&page(&["search"])), Ok(Some(0)));
        let compiled = compiler.compile().unwrap();
        assert_eq!(compiled.stats.filtered, 1);
        assert_eq!(compiled.stats.documents, 1);
    }
}
