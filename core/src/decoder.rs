//! Reader for the artifact written by [`crate::encoder`].
//!
//! The query engine that consumes the artifact lives elsewhere; this reader exists to verify
//! artifacts and report statistics about them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::encoder::{FLAG_HAS_CHILDREN, FLAG_HAS_OCCURRENCES, MAGIC};
use crate::error::DecodeError;
use crate::index::Occurrence;
use crate::registry::{DocId, Document};

const MAX_VARINT_BYTES: usize = 10;

pub struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub fn read_fixed(&mut self, width: usize) -> Result<u64, DecodeError> {
        let bytes = self.read_bytes(width)?;
        Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(DecodeError::UnexpectedEof { offset: self.bytes.len() })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let start = self.offset;
        let mut value = 0u64;
        for i in 0..MAX_VARINT_BYTES {
            let byte = *self
                .bytes
                .get(self.offset)
                .ok_or(DecodeError::UnexpectedEof { offset: self.offset })?;
            self.offset += 1;
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(DecodeError::VarintTooLong { offset: start })
    }

    /// A varint that must fit a `u32`, such as a document id or an occurrence count.
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let offset = self.offset;
        let value = self.read_varint()?;
        u32::try_from(value).map_err(|_| DecodeError::ValueOutOfRange { value, offset })
    }

    pub fn read_str(&mut self) -> Result<String, DecodeError> {
        let len = self.read_varint()? as usize;
        let offset = self.offset;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { offset })
    }
}

/// Figures reported by `indexer inspect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrieStats {
    pub nodes: usize,
    pub terms: usize,
    pub occurrences: u64,
    pub max_depth: usize,
    pub pop_markers: usize,
    pub max_pop_distance: u64,
    pub total_pop_distance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedIndex {
    pub documents: Vec<Document>,
    pub terms: BTreeMap<String, Vec<Occurrence>>,
    pub stats: TrieStats,
}

impl DecodedIndex {
    /// Occurrences of every term starting with `prefix`.
    pub fn find_prefix(&self, prefix: &str) -> Vec<(&str, &[Occurrence])> {
        self.terms
            .range(prefix.to_string()..)
            .take_while(|(text, _)| text.starts_with(prefix))
            .map(|(text, occ)| (text.as_str(), occ.as_slice()))
            .collect()
    }
}

pub fn decode(bytes: &[u8]) -> Result<DecodedIndex, DecodeError> {
    let mut reader = ByteReader::new(bytes);
    let magic = reader.read_fixed(4)? as u32;
    if magic != MAGIC {
        return Err(DecodeError::BadMagic { found: magic });
    }
    let documents = decode_documents(&mut reader)?;
    let (terms, stats) = decode_trie(&mut reader)?;
    if reader.remaining() > 0 {
        return Err(DecodeError::TrailingBytes(reader.remaining()));
    }
    Ok(DecodedIndex { documents, terms, stats })
}

pub fn decode_documents(reader: &mut ByteReader<'_>) -> Result<Vec<Document>, DecodeError> {
    let count = reader.read_varint()?;
    let mut documents = Vec::new();
    for _ in 0..count {
        let offset = reader.offset();
        let id_flags = reader.read_varint()?;
        let id = DocId::try_from(id_flags >> 1)
            .map_err(|_| DecodeError::ValueOutOfRange { value: id_flags >> 1, offset })?;
        let title = reader.read_str()?;
        let url = reader.read_str()?;
        documents.push(Document { id, is_page: id_flags & 0x01 != 0, title, url });
    }
    Ok(documents)
}

pub fn decode_trie(
    reader: &mut ByteReader<'_>,
) -> Result<(BTreeMap<String, Vec<Occurrence>>, TrieStats), DecodeError> {
    let mut terms = BTreeMap::new();
    let mut stats = TrieStats::default();
    // Keys of the open nodes; the root's key is never part of a word.
    let mut path: Vec<char> = Vec::new();

    loop {
        let key = reader.read_varint()?;
        let code_point = key >> 2;
        let ch = u32::try_from(code_point)
            .ok()
            .and_then(char::from_u32)
            .ok_or(DecodeError::InvalidCodePoint(code_point))?;
        path.push(ch);
        stats.nodes += 1;
        stats.max_depth = stats.max_depth.max(path.len());

        if key & FLAG_HAS_OCCURRENCES != 0 {
            let count = reader.read_varint()?;
            let mut occurrences = Vec::new();
            for _ in 0..count {
                let document = reader.read_u32()?;
                let count = reader.read_u32()?;
                stats.occurrences += u64::from(count);
                occurrences.push(Occurrence { document, count });
            }
            stats.terms += 1;
            terms.insert(path[1..].iter().collect::<String>(), occurrences);
        }

        if key & FLAG_HAS_CHILDREN == 0 {
            let pop = reader.read_varint()?;
            if pop == 0 || pop > path.len() as u64 {
                return Err(DecodeError::BadPop { pop, depth: path.len() });
            }
            stats.pop_markers += 1;
            stats.max_pop_distance = stats.max_pop_distance.max(pop);
            stats.total_pop_distance += pop;
            path.truncate(path.len() - pop as usize);
            if path.is_empty() {
                break;
            }
        }
    }

    Ok((terms, stats))
}
