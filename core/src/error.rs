use std::path::PathBuf;
use thiserror::Error;

/// Raised while writing the artifact. Values are never wrapped or truncated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("cannot encode {value} as an unsigned varint")]
    VarintOutOfRange { value: String },
    #[error("value {value} does not fit in {width} bytes")]
    FixedWidthOverflow { value: u64, width: usize },
    #[error("fixed width must be between 1 and 8 bytes, got {0}")]
    InvalidWidth(usize),
    #[error("document {0} exceeds the largest document id")]
    TooManyDocuments(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of data at offset {offset}")]
    UnexpectedEof { offset: usize },
    #[error("incorrect file magic {found:#010x} (expected 'SRCH')")]
    BadMagic { found: u32 },
    #[error("varint at offset {offset} is longer than 10 bytes")]
    VarintTooLong { offset: usize },
    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("value {value} at offset {offset} does not fit in 32 bits")]
    ValueOutOfRange { value: u64, offset: usize },
    #[error("invalid code point {0:#x} in trie")]
    InvalidCodePoint(u64),
    #[error("pop of {pop} levels at depth {depth}")]
    BadPop { pop: u64, depth: usize },
    #[error("{0} trailing bytes after trie")]
    TrailingBytes(usize),
}

#[derive(Debug, Error)]
pub enum SourceError {
    /// Fatal to the whole run.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Fatal to the whole run: the file itself cannot be parsed.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    /// Document-level: the caller skips the document.
    #[error("malformed metadata in {origin}: {message}")]
    Metadata { origin: String, message: String },
}

impl SourceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Io { path: path.into(), source }
    }

    pub fn metadata(origin: impl Into<String>, message: impl ToString) -> Self {
        SourceError::Metadata { origin: origin.into(), message: message.to_string() }
    }
}
