//! Copying pages between documents.
//!
//! A page is imported together with every object it references, each under a
//! fresh object id in the target. Objects already imported from the same
//! source (fonts, images shared between pages) are reused rather than copied
//! again. Streams are carried over byte for byte.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::PagedDocument;
use crate::error::CopyError;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against cyclic Parent chains in broken files.
const MAX_TREE_DEPTH: usize = 64;

impl PagedDocument {
    /// Append a copy of 1-based page `page` of `source` to this document.
    ///
    /// The target must have a flat page tree, as documents from
    /// [`PagedDocument::new`] do.
    pub fn copy_page_from(&mut self, source: &PagedDocument, page: u32) -> Result<(), CopyError> {
        let page_id = source.page_id(page).ok_or_else(|| {
            CopyError(format!(
                "page {} does not exist (document has {} pages)",
                page,
                source.page_count()
            ))
        })?;
        let mut page_dict = source
            .doc
            .get_dictionary(page_id)
            .map_err(|e| CopyError(format!("page {} is unreadable: {}", page, e)))?
            .clone();
        let pages_root = self.pages_root()?;

        for key in INHERITABLE {
            if !page_dict.has(key) {
                if let Some(value) = source.inherited_attribute(page_id, key) {
                    page_dict.set(key, value);
                }
            }
        }
        page_dict.remove(b"Parent");

        let new_page_id = self.doc.new_object_id();
        self.imported.insert((source.key, page_id), new_page_id);

        let mut importer = Importer {
            source,
            target: &mut self.doc,
            imported: &mut self.imported,
            pending: Vec::new(),
        };
        let mut page_dict = importer.rewrite_dictionary(page_dict);
        importer.drain();

        page_dict.set("Parent", Object::Reference(pages_root));
        self.doc
            .objects
            .insert(new_page_id, Object::Dictionary(page_dict));
        self.append_kid(pages_root, new_page_id)?;
        self.pages.push(new_page_id);
        Ok(())
    }

    fn pages_root(&self) -> Result<ObjectId, CopyError> {
        self.doc
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|e| CopyError(format!("target has no page tree: {}", e)))
    }

    fn append_kid(&mut self, root: ObjectId, page_id: ObjectId) -> Result<(), CopyError> {
        let pages = self
            .doc
            .get_dictionary_mut(root)
            .map_err(|e| CopyError(format!("target page tree is unreadable: {}", e)))?;
        let count = match pages.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => {
                kids.push(Object::Reference(page_id));
                kids.len()
            }
            _ => return Err(CopyError("target page tree has no Kids array".into())),
        };
        pages.set("Count", Object::Integer(count as i64));
        Ok(())
    }

    /// Look `key` up on the page's ancestors, nearest first.
    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut node = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
            node = self.doc.get_dictionary(parent).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value.clone());
            }
        }
        None
    }

    fn is_page_tree_node(&self, id: ObjectId) -> bool {
        match self.doc.get_dictionary(id).and_then(|dict| dict.get(b"Type")) {
            Ok(Object::Name(name)) => name == b"Page" || name == b"Pages",
            _ => false,
        }
    }
}

struct Importer<'a> {
    source: &'a PagedDocument,
    target: &'a mut Document,
    imported: &'a mut HashMap<(u64, ObjectId), ObjectId>,
    /// Objects that have a target id but have not been copied yet.
    pending: Vec<(ObjectId, ObjectId)>,
}

impl Importer<'_> {
    fn drain(&mut self) {
        while let Some((original, mapped)) = self.pending.pop() {
            // dangling references are legal PDF and read as null
            let object = self
                .source
                .doc
                .get_object(original)
                .cloned()
                .unwrap_or(Object::Null);
            let object = self.rewrite(object);
            self.target.objects.insert(mapped, object);
        }
    }

    fn map_reference(&mut self, id: ObjectId) -> Object {
        let key = (self.source.key, id);
        if let Some(&mapped) = self.imported.get(&key) {
            return Object::Reference(mapped);
        }
        // pages that were not copied, and the source page tree, stay behind
        if self.source.is_page_tree_node(id) {
            return Object::Null;
        }
        let mapped = self.target.new_object_id();
        self.imported.insert(key, mapped);
        self.pending.push((id, mapped));
        Object::Reference(mapped)
    }

    fn rewrite(&mut self, object: Object) -> Object {
        match object {
            Object::Reference(id) => self.map_reference(id),
            Object::Array(items) => {
                Object::Array(items.into_iter().map(|item| self.rewrite(item)).collect())
            }
            Object::Dictionary(dict) => Object::Dictionary(self.rewrite_dictionary(dict)),
            Object::Stream(mut stream) => {
                stream.dict = self.rewrite_dictionary(stream.dict);
                Object::Stream(stream)
            }
            other => other,
        }
    }

    fn rewrite_dictionary(&mut self, mut dict: Dictionary) -> Dictionary {
        for (_, value) in dict.iter_mut() {
            let original = std::mem::replace(value, Object::Null);
            *value = self.rewrite(original);
        }
        dict
    }
}
