//! Fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{CopyError, DocumentLoadError, SerializeError};
use crate::pdf::{DocumentBackend, PagedDocument};

fn name(s: &str) -> Object {
    Object::Name(s.as_bytes().to_vec())
}

fn letter_media_box() -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ])
}

fn content_stream(doc: &mut Document, text: &str) -> ObjectId {
    let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
    doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()))
}

fn font(doc: &mut Document) -> ObjectId {
    let mut font = Dictionary::new();
    font.set("Type", name("Font"));
    font.set("Subtype", name("Type1"));
    font.set("BaseFont", name("Helvetica"));
    doc.add_object(font)
}

fn finish(mut doc: Document, pages_id: ObjectId, pages: Dictionary) -> Vec<u8> {
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", name("Catalog"));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A PDF with `num_pages` pages whose content draws `{label}-{n}`.
pub fn build_pdf(label: &str, num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = font(&mut doc);

    let mut kids = Vec::new();
    for n in 1..=num_pages {
        let content_id = content_stream(&mut doc, &format!("{}-{}", label, n));

        let mut fonts = Dictionary::new();
        fonts.set("F1", Object::Reference(font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));

        let mut page = Dictionary::new();
        page.set("Type", name("Page"));
        page.set("Parent", Object::Reference(pages_id));
        page.set("MediaBox", letter_media_box());
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Reference(content_id));
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", name("Pages"));
    pages.set("Count", Object::Integer(num_pages as i64));
    pages.set("Kids", Object::Array(kids));
    finish(doc, pages_id, pages)
}

/// Like [`build_pdf`] with label "I", but `Resources` and `MediaBox` live on
/// the page tree root and are inherited by every page.
pub fn build_pdf_with_inherited_resources(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = font(&mut doc);

    let mut fonts = Dictionary::new();
    fonts.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    let resources_id = doc.add_object(resources);

    let mut kids = Vec::new();
    for n in 1..=num_pages {
        let content_id = content_stream(&mut doc, &format!("I-{}", n));
        let mut page = Dictionary::new();
        page.set("Type", name("Page"));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", name("Pages"));
    pages.set("Count", Object::Integer(num_pages as i64));
    pages.set("Kids", Object::Array(kids));
    pages.set("MediaBox", letter_media_box());
    pages.set("Resources", Object::Reference(resources_id));
    finish(doc, pages_id, pages)
}

/// The text drawn on each page of a fixture document, in page order.
pub fn page_labels(doc: &PagedDocument) -> Vec<String> {
    (1..=doc.page_count())
        .map(|page| {
            let id = doc.page_id(page).unwrap();
            let content = doc.document().get_page_content(id).unwrap();
            let content = String::from_utf8(content).unwrap();
            let start = content.find('(').unwrap() + 1;
            let end = content.rfind(')').unwrap();
            content[start..end].to_string()
        })
        .collect()
}

/// Encoded form of a [`LabelBackend`] document.
pub fn label_doc(label: &str, num_pages: u32) -> Vec<u8> {
    let mut text = String::from("LABELS\n");
    for n in 1..=num_pages {
        text.push_str(&format!("{}-{}\n", label, n));
    }
    text.into_bytes()
}

/// In-memory backend whose documents are lists of page labels.
///
/// Can be told to fail on the n-th page copy (1-based).
#[derive(Default)]
pub struct LabelBackend {
    fail_on_copy: Option<usize>,
    copies: AtomicUsize,
}

impl LabelBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(copy: usize) -> Self {
        LabelBackend {
            fail_on_copy: Some(copy),
            copies: AtomicUsize::new(0),
        }
    }

    pub fn copies(&self) -> usize {
        self.copies.load(Ordering::SeqCst)
    }
}

impl DocumentBackend for LabelBackend {
    type Document = Vec<String>;

    fn load(&self, bytes: &[u8]) -> Result<Vec<String>, DocumentLoadError> {
        let text = std::str::from_utf8(bytes).map_err(|e| DocumentLoadError {
            reason: e.to_string(),
        })?;
        let mut lines = text.lines();
        if lines.next() != Some("LABELS") {
            return Err(DocumentLoadError {
                reason: "missing LABELS header".into(),
            });
        }
        Ok(lines.filter(|l| !l.is_empty()).map(str::to_string).collect())
    }

    fn page_count(&self, document: &Vec<String>) -> u32 {
        document.len() as u32
    }

    fn create(&self) -> Vec<String> {
        Vec::new()
    }

    fn copy_page(
        &self,
        target: &mut Vec<String>,
        source: &Vec<String>,
        page: u32,
    ) -> Result<(), CopyError> {
        let copy = self.copies.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_copy == Some(copy) {
            return Err(CopyError(format!("injected failure on copy {}", copy)));
        }
        let label = page
            .checked_sub(1)
            .and_then(|i| source.get(i as usize))
            .ok_or_else(|| CopyError(format!("no page {}", page)))?;
        target.push(label.clone());
        Ok(())
    }

    fn serialize(&self, document: &mut Vec<String>) -> Result<Vec<u8>, SerializeError> {
        let mut text = String::from("LABELS\n");
        for label in document.iter() {
            text.push_str(label);
            text.push('\n');
        }
        Ok(text.into_bytes())
    }
}
