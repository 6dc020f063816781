//! Building a new document out of pages of existing ones.
//!
//! Merge, extract, reorder and each part of a split all come down to the same
//! thing: an [`AssemblyPlan`] listing which pages of which documents to copy,
//! in order, into a fresh document.

use tracing::debug;

use crate::error::AssemblyError;
use crate::page_range::{PageIndexSet, PageOrder};
use crate::pdf::DocumentBackend;
use crate::progress::ProgressReporter;

struct PlanEntry<'a, D> {
    document: &'a D,
    pages: Vec<u32>,
}

/// Ordered `(document, pages)` pairs making up one output document.
pub struct AssemblyPlan<'a, D> {
    entries: Vec<PlanEntry<'a, D>>,
}

impl<'a, D> AssemblyPlan<'a, D> {
    pub fn new() -> Self {
        AssemblyPlan {
            entries: Vec::new(),
        }
    }

    /// Every page of every document, documents in the order given.
    pub fn merge<B>(backend: &B, documents: impl IntoIterator<Item = &'a D>) -> Self
    where
        B: DocumentBackend<Document = D>,
    {
        let mut plan = Self::new();
        for document in documents {
            let total = backend.page_count(document);
            plan.entries.push(PlanEntry {
                document,
                pages: (1..=total).collect(),
            });
        }
        plan
    }

    pub fn extract(document: &'a D, pages: &PageIndexSet) -> Self {
        let mut plan = Self::new();
        plan.push(document, pages);
        plan
    }

    /// The pages of `document` in exactly the order of `order`.
    pub fn reorder(document: &'a D, order: &PageOrder) -> Self {
        let mut plan = Self::new();
        plan.push_ordered(document, order);
        plan
    }

    pub fn push(&mut self, document: &'a D, pages: &PageIndexSet) {
        self.entries.push(PlanEntry {
            document,
            pages: pages.as_slice().to_vec(),
        });
    }

    pub fn push_ordered(&mut self, document: &'a D, order: &PageOrder) {
        self.entries.push(PlanEntry {
            document,
            pages: order.as_slice().to_vec(),
        });
    }

    /// Number of page copies the plan will perform.
    pub fn total_pages(&self) -> usize {
        self.entries.iter().map(|entry| entry.pages.len()).sum()
    }
}

impl<D> Default for AssemblyPlan<'_, D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy the pages named by `plan` into a new document.
///
/// Pages are copied one at a time in plan order, yielding to the runtime
/// between copies. `progress` sees the fraction of copies done after each one.
/// If any copy fails the partly built document is dropped and nothing is
/// returned but the error.
pub async fn assemble<B: DocumentBackend>(
    backend: &B,
    plan: AssemblyPlan<'_, B::Document>,
    progress: &dyn ProgressReporter,
) -> Result<B::Document, AssemblyError> {
    let total = plan.total_pages();
    if total == 0 {
        return Err(AssemblyError::EmptyPlan);
    }

    let mut output = backend.create();
    let mut copied = 0;
    for (index, entry) in plan.entries.iter().enumerate() {
        for &page in &entry.pages {
            backend
                .copy_page(&mut output, entry.document, page)
                .map_err(|e| AssemblyError::CopyFailed {
                    input: index + 1,
                    page,
                    reason: e.to_string(),
                })?;
            copied += 1;
            progress.report(copied as f64 / total as f64);
            tokio::task::yield_now().await;
        }
    }

    debug!(inputs = plan.entries.len(), pages = total, "assembled document");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_range::{parse_selector, PageSelector};
    use crate::pdf::{Lopdf, PagedDocument};
    use crate::progress::NoProgress;
    use crate::test_support::{build_pdf, label_doc, page_labels, LabelBackend};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn labels(backend: &LabelBackend, label: &str, pages: u32) -> Vec<String> {
        backend.load(&label_doc(label, pages)).unwrap()
    }

    #[tokio::test]
    async fn test_merge_keeps_document_order() {
        let backend = LabelBackend::new();
        let a = labels(&backend, "A", 3);
        let b = labels(&backend, "B", 2);

        let plan = AssemblyPlan::merge(&backend, [&a, &b]);
        let merged = assemble(&backend, plan, &NoProgress).await.unwrap();
        assert_eq!(merged, vec!["A-1", "A-2", "A-3", "B-1", "B-2"]);
    }

    #[tokio::test]
    async fn test_extract_selected_pages() {
        let backend = LabelBackend::new();
        let doc = labels(&backend, "A", 5);
        let pages = parse_selector("2,4", 5).unwrap();

        let extracted = assemble(&backend, AssemblyPlan::extract(&doc, &pages), &NoProgress)
            .await
            .unwrap();
        assert_eq!(extracted, vec!["A-2", "A-4"]);
    }

    #[tokio::test]
    async fn test_reorder_follows_user_order() {
        let backend = LabelBackend::new();
        let doc = labels(&backend, "A", 4);
        let order = PageSelector::parse("4,1,3")
            .unwrap()
            .resolve_order(4)
            .unwrap();

        let reordered = assemble(&backend, AssemblyPlan::reorder(&doc, &order), &NoProgress)
            .await
            .unwrap();
        assert_eq!(reordered, vec!["A-4", "A-1", "A-3"]);
    }

    #[tokio::test]
    async fn test_mixed_plan() {
        let backend = LabelBackend::new();
        let a = labels(&backend, "A", 3);
        let b = labels(&backend, "B", 3);

        let mut plan = AssemblyPlan::new();
        plan.push(&b, &parse_selector("3", 3).unwrap());
        plan.push(&a, &parse_selector("1-2", 3).unwrap());
        plan.push(&b, &parse_selector("1", 3).unwrap());
        assert_eq!(plan.total_pages(), 4);

        let out = assemble(&backend, plan, &NoProgress).await.unwrap();
        assert_eq!(out, vec!["B-3", "A-1", "A-2", "B-1"]);
    }

    #[tokio::test]
    async fn test_empty_plan() {
        let backend = LabelBackend::new();
        let empty = labels(&backend, "E", 0);

        let err = assemble(&backend, AssemblyPlan::new(), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, AssemblyError::EmptyPlan));

        let err = assemble(&backend, AssemblyPlan::merge(&backend, [&empty]), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, AssemblyError::EmptyPlan));
    }

    #[tokio::test]
    async fn test_copy_failure_aborts() {
        let backend = LabelBackend::failing_on(3);
        let a = labels(&backend, "A", 2);
        let b = labels(&backend, "B", 2);
        let reports = Mutex::new(Vec::new());
        let progress = |f: f64| reports.lock().unwrap().push(f);

        let err = assemble(&backend, AssemblyPlan::merge(&backend, [&a, &b]), &progress)
            .await
            .unwrap_err();
        match err {
            AssemblyError::CopyFailed { input, page, .. } => {
                assert_eq!((input, page), (2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
        // nothing is attempted after the failing copy
        assert_eq!(backend.copies(), 3);
        assert_eq!(reports.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_complete() {
        let backend = LabelBackend::new();
        let a = labels(&backend, "A", 3);
        let b = labels(&backend, "B", 1);
        let reports = Mutex::new(Vec::new());
        let progress = |f: f64| reports.lock().unwrap().push(f);

        assemble(&backend, AssemblyPlan::merge(&backend, [&a, &b]), &progress)
            .await
            .unwrap();

        let reports = reports.into_inner().unwrap();
        assert_eq!(reports, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[tokio::test]
    async fn test_progress_does_not_change_output() {
        let backend = LabelBackend::new();
        let a = labels(&backend, "A", 4);
        let pages = parse_selector("1,3-4", 4).unwrap();

        let quiet = assemble(&backend, AssemblyPlan::extract(&a, &pages), &NoProgress)
            .await
            .unwrap();
        let noisy = assemble(&backend, AssemblyPlan::extract(&a, &pages), &|_: f64| {})
            .await
            .unwrap();
        assert_eq!(quiet, noisy);
    }

    #[tokio::test]
    async fn test_lopdf_merge() {
        let a = PagedDocument::load_mem(&build_pdf("A", 3)).unwrap();
        let b = PagedDocument::load_mem(&build_pdf("B", 2)).unwrap();

        let mut merged = assemble(&Lopdf, AssemblyPlan::merge(&Lopdf, [&a, &b]), &NoProgress)
            .await
            .unwrap();
        let reloaded = PagedDocument::load_mem(&merged.to_bytes().unwrap()).unwrap();
        assert_eq!(
            page_labels(&reloaded),
            vec!["A-1", "A-2", "A-3", "B-1", "B-2"]
        );
    }

    #[tokio::test]
    async fn test_lopdf_split_then_merge_round_trip() {
        let original = PagedDocument::load_mem(&build_pdf("R", 4)).unwrap();

        let mut parts = Vec::new();
        for page in 1..=original.page_count() {
            let plan = AssemblyPlan::extract(&original, &PageIndexSet::single(page));
            let mut part = assemble(&Lopdf, plan, &NoProgress).await.unwrap();
            parts.push(PagedDocument::load_mem(&part.to_bytes().unwrap()).unwrap());
        }
        assert!(parts.iter().all(|part| part.page_count() == 1));

        let merged = assemble(&Lopdf, AssemblyPlan::merge(&Lopdf, &parts), &NoProgress)
            .await
            .unwrap();
        assert_eq!(merged.page_count(), original.page_count());
        assert_eq!(page_labels(&merged), page_labels(&original));
    }
}
