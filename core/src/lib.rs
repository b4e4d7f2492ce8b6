//! Compiler for the static site search index.
//!
//! Documents are tokenized, gathered into a term index, folded into a code-point trie and
//! written out as a compact binary artifact for the client-side query engine.

pub mod compiler;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod extract;
pub mod index;
pub mod persist;
pub mod registry;
pub mod source;
pub mod tokenizer;
pub mod trie;

pub use compiler::{BuildStats, CompiledIndex, CompilerConfig, IndexCompiler};
pub use error::{DecodeError, EncodeError, SourceError};
pub use extract::Extractor;
pub use index::{Occurrence, StopWords, Term, TermId, TermIndex};
pub use registry::{DocId, Document, DocumentRegistry};
pub use source::SourceDocument;
pub use trie::Trie;
