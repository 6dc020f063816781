use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;

use crate::error::{DocumentLoadError, SerializeError};

static NEXT_DOCUMENT_KEY: AtomicU64 = AtomicU64::new(1);

/// A decoded PDF with its pages in reading order.
#[derive(Debug)]
pub struct PagedDocument {
    pub(super) doc: Document,
    pub(super) pages: Vec<ObjectId>,
    /// Distinguishes this document in other documents' import maps.
    pub(super) key: u64,
    /// `(source key, source object) -> object in this document` for everything
    /// copied in so far.
    pub(super) imported: HashMap<(u64, ObjectId), ObjectId>,
}

impl PagedDocument {
    pub fn load_mem(bytes: &[u8]) -> Result<Self, DocumentLoadError> {
        let doc = Document::load_mem(bytes).map_err(|e| DocumentLoadError {
            reason: e.to_string(),
        })?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: Document) -> Self {
        // get_pages is keyed by 1-based page number, so values come out in order
        let pages = doc.get_pages().into_values().collect();
        PagedDocument {
            doc,
            pages,
            key: NEXT_DOCUMENT_KEY.fetch_add(1, Ordering::Relaxed),
            imported: HashMap::new(),
        }
    }

    /// An empty document with a flat page tree, ready to receive copied pages.
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Kids", Object::Array(Vec::new()));
        pages.set("Count", Object::Integer(0));
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        Self::from_document(doc)
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Object id of a 1-based page
    pub fn page_id(&self, page: u32) -> Option<ObjectId> {
        let index = page.checked_sub(1)? as usize;
        self.pages.get(index).copied()
    }

    #[cfg(test)]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Get metadata from the document info dictionary
    pub fn info(&self) -> DocumentInfo {
        let mut info = DocumentInfo {
            version: self.doc.version.clone(),
            page_count: self.page_count(),
            ..Default::default()
        };

        let dict = self
            .doc
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .and_then(|id| self.doc.get_dictionary(id));
        if let Ok(dict) = dict {
            info.title = get_string_from_dict(dict, b"Title");
            info.author = get_string_from_dict(dict, b"Author");
            info.creator = get_string_from_dict(dict, b"Creator");
            info.producer = get_string_from_dict(dict, b"Producer");
            info.creation_date = get_string_from_dict(dict, b"CreationDate");
            info.subject = get_string_from_dict(dict, b"Subject");
        }

        info
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>, SerializeError> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| SerializeError(e.to_string()))?;
        Ok(buffer)
    }
}

impl Default for PagedDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct DocumentInfo {
    pub version: String,
    pub page_count: u32,
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub subject: Option<String>,
}

fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        _ => None,
    }
}

fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        // PDFDocEncoding agrees with Latin-1 for printable text
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}
