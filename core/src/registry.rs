use serde::Serialize;

use crate::error::EncodeError;

pub type DocId = u32;

/// A post or page accepted into the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: DocId,
    pub is_page: bool,
    pub title: String,
    pub url: String,
}

/// Hands out sequential document ids in discovery order.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document that survived tag filtering. Never deduplicates.
    pub fn register(
        &mut self,
        is_page: bool,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<DocId, EncodeError> {
        let id = next_id(self.documents.len())?;
        self.documents.push(Document { id, is_page, title: title.into(), url: url.into() });
        Ok(id)
    }

    /// All documents, ascending by id.
    pub fn all_documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.documents.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn next_id(count: usize) -> Result<DocId, EncodeError> {
    DocId::try_from(count).map_err(|_| EncodeError::TooManyDocuments(count))
}
