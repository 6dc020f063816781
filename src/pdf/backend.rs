use crate::error::{CopyError, DocumentLoadError, SerializeError};
use crate::pdf::PagedDocument;

/// The paged-document library the assembler works through.
///
/// Page numbers are 1-based throughout.
pub trait DocumentBackend {
    type Document;

    fn load(&self, bytes: &[u8]) -> Result<Self::Document, DocumentLoadError>;

    fn page_count(&self, document: &Self::Document) -> u32;

    /// A new document without pages.
    fn create(&self) -> Self::Document;

    /// Append page `page` of `source` to the end of `target`.
    fn copy_page(
        &self,
        target: &mut Self::Document,
        source: &Self::Document,
        page: u32,
    ) -> Result<(), CopyError>;

    fn serialize(&self, document: &mut Self::Document) -> Result<Vec<u8>, SerializeError>;
}

/// PDF backend built on lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lopdf;

impl DocumentBackend for Lopdf {
    type Document = PagedDocument;

    fn load(&self, bytes: &[u8]) -> Result<PagedDocument, DocumentLoadError> {
        PagedDocument::load_mem(bytes)
    }

    fn page_count(&self, document: &PagedDocument) -> u32 {
        document.page_count()
    }

    fn create(&self) -> PagedDocument {
        PagedDocument::new()
    }

    fn copy_page(
        &self,
        target: &mut PagedDocument,
        source: &PagedDocument,
        page: u32,
    ) -> Result<(), CopyError> {
        target.copy_page_from(source, page)
    }

    fn serialize(&self, document: &mut PagedDocument) -> Result<Vec<u8>, SerializeError> {
        document.to_bytes()
    }
}
