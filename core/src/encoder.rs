//! Binary artifact writer.
//!
//! Layout:
//!
//! ```text
//! magic        u32 big-endian 0x53524348 ("SRCH")
//! doc_count    varint
//! documents    doc_count times:
//!                varint (id << 1) | is_page
//!                varint title length, title UTF-8 bytes
//!                varint url length, url UTF-8 bytes
//! trie         pre-order, children ascending by code point:
//!                varint (code_point << 2) | (has_occurrences << 1) | has_children
//!                if has_occurrences:
//!                  varint count, then count times: varint doc id, varint occurrences
//!                after every node without children:
//!                  varint number of levels closed (the node itself included)
//! ```
//!
//! The final pop marker also closes the root, so a reader's stack is empty exactly at the
//! end of the data.

use std::fmt::Display;

use serde::Serialize;

use crate::error::EncodeError;
use crate::index::Occurrence;
use crate::registry::Document;
use crate::trie::{Step, Trie, TrieNode};

pub const MAGIC: u32 = 0x5352_4348;

pub const FLAG_HAS_CHILDREN: u64 = 0x01;
pub const FLAG_HAS_OCCURRENCES: u64 = 0x02;

/// Append-only byte buffer with the two primitive write operations of the format.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` big-endian in exactly `width` bytes.
    pub fn write_fixed(&mut self, value: u64, width: usize) -> Result<(), EncodeError> {
        if width == 0 || width > 8 {
            return Err(EncodeError::InvalidWidth(width));
        }
        if width < 8 && value >> (width * 8) != 0 {
            return Err(EncodeError::FixedWidthOverflow { value, width });
        }
        self.buffer.extend_from_slice(&value.to_be_bytes()[8 - width..]);
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Write an unsigned varint: 7 bits per byte, least significant group first, high bit set
    /// on every byte but the last. Negative values are rejected.
    pub fn write_varint<T>(&mut self, value: T) -> Result<(), EncodeError>
    where
        T: TryInto<u64> + Display + Copy,
    {
        let mut n: u64 = value
            .try_into()
            .map_err(|_| EncodeError::VarintOutOfRange { value: value.to_string() })?;
        while n >= 0x80 {
            self.buffer.push((n & 0x7f) as u8 | 0x80);
            n >>= 7;
        }
        self.buffer.push(n as u8);
        Ok(())
    }

    /// Varint length prefix followed by the raw UTF-8 bytes.
    pub fn write_str(&mut self, text: &str) -> Result<(), EncodeError> {
        self.write_varint(text.len())?;
        self.write_bytes(text.as_bytes());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Counters gathered while writing the trie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EncodeStats {
    pub documents: usize,
    pub nodes: usize,
    pub terms: usize,
    pub max_depth: usize,
    pub pop_markers: usize,
    pub bytes: usize,
}

/// Encode the document table and the trie into a complete artifact.
pub fn encode(documents: &[Document], trie: &Trie) -> Result<(Vec<u8>, EncodeStats), EncodeError> {
    let mut out = ByteWriter::new();
    out.write_fixed(u64::from(MAGIC), 4)?;
    encode_documents(&mut out, documents)?;
    let mut stats = encode_trie(&mut out, trie)?;
    stats.documents = documents.len();
    stats.bytes = out.len();
    Ok((out.into_bytes(), stats))
}

pub fn encode_documents(out: &mut ByteWriter, documents: &[Document]) -> Result<(), EncodeError> {
    out.write_varint(documents.len())?;
    for doc in documents {
        out.write_varint((u64::from(doc.id) << 1) | u64::from(doc.is_page))?;
        out.write_str(&doc.title)?;
        out.write_str(&doc.url)?;
    }
    Ok(())
}

pub fn encode_trie(out: &mut ByteWriter, trie: &Trie) -> Result<EncodeStats, EncodeError> {
    let mut stats = EncodeStats::default();
    // Levels closed since the last node was written.
    let mut closed: u64 = 0;
    let mut walk = trie.walk();

    while let Some(step) = walk.next() {
        match step {
            Step::Enter(id) => {
                flush_pops(out, &mut closed, &mut stats)?;
                encode_node(out, trie.node(id))?;
                stats.nodes += 1;
                stats.max_depth = stats.max_depth.max(walk.depth());
                if trie.node(id).has_occurrences() {
                    stats.terms += 1;
                }
            }
            Step::Leave(_) => closed += 1,
        }
    }
    flush_pops(out, &mut closed, &mut stats)?;
    Ok(stats)
}

fn flush_pops(out: &mut ByteWriter, closed: &mut u64, stats: &mut EncodeStats) -> Result<(), EncodeError> {
    if *closed > 0 {
        out.write_varint(*closed)?;
        stats.pop_markers += 1;
        *closed = 0;
    }
    Ok(())
}

fn encode_node(out: &mut ByteWriter, node: &TrieNode) -> Result<(), EncodeError> {
    let mut key = u64::from(u32::from(node.key)) << 2;
    if node.has_children() {
        key |= FLAG_HAS_CHILDREN;
    }
    match node.occurrences.as_deref() {
        Some(occurrences) if !occurrences.is_empty() => {
            out.write_varint(key | FLAG_HAS_OCCURRENCES)?;
            encode_occurrences(out, occurrences)
        }
        _ => out.write_varint(key),
    }
}

fn encode_occurrences(out: &mut ByteWriter, occurrences: &[Occurrence]) -> Result<(), EncodeError> {
    out.write_varint(occurrences.len())?;
    for occurrence in occurrences {
        out.write_varint(occurrence.document)?;
        out.write_varint(occurrence.count)?;
    }
    Ok(())
}
