//! End-to-end pipelines behind the user-facing tools.
//!
//! Each operation is all-or-nothing: it either returns a complete
//! [`OutputArtifact`] or an [`OperationError`], never a partial result.

use std::path::Path;

use tracing::info;

use crate::assemble::{assemble, AssemblyPlan};
use crate::error::OperationError;
use crate::output::{package, NamingPolicy, OutputArtifact};
use crate::page_range::PageSelector;
use crate::pdf::DocumentBackend;
use crate::plan::{plan_split, SplitMode};
use crate::progress::{ProgressReporter, Scaled};

pub const MERGED_NAME: &str = "merged-document.pdf";
pub const EXTRACTED_NAME: &str = "extracted-pages.pdf";
pub const ORGANIZED_NAME: &str = "organized-document.pdf";

/// Raw bytes supplied by the user, with the name they came under.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        SourceFile {
            name: name.into(),
            bytes,
        }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Ok(SourceFile::new(path.display().to_string(), bytes))
    }
}

fn load<B: DocumentBackend>(backend: &B, file: &SourceFile) -> Result<B::Document, OperationError> {
    backend
        .load(&file.bytes)
        .map_err(|source| OperationError::Load {
            name: file.name.clone(),
            source,
        })
}

/// Concatenate every page of `files`, in the order given.
pub async fn merge<B: DocumentBackend>(
    backend: &B,
    files: &[SourceFile],
    progress: &dyn ProgressReporter,
) -> Result<OutputArtifact, OperationError> {
    if files.is_empty() {
        return Err(OperationError::NoInputs);
    }

    let documents = files
        .iter()
        .map(|file| load(backend, file))
        .collect::<Result<Vec<_>, _>>()?;

    let plan = AssemblyPlan::merge(backend, &documents);
    let pages = plan.total_pages();
    let merged = assemble(backend, plan, progress).await?;
    info!(files = files.len(), pages, "merged documents");

    Ok(package(
        vec![merged],
        &NamingPolicy::Single(MERGED_NAME.to_string()),
        |doc| backend.serialize(doc),
    )?)
}

/// Copy the pages named by `selector` into a new document, in page order.
pub async fn extract<B: DocumentBackend>(
    backend: &B,
    file: &SourceFile,
    selector: &str,
    progress: &dyn ProgressReporter,
) -> Result<OutputArtifact, OperationError> {
    let selector = PageSelector::parse(selector)?;
    let document = load(backend, file)?;
    let pages = selector.resolve(backend.page_count(&document))?;

    let extracted = assemble(backend, AssemblyPlan::extract(&document, &pages), progress).await?;
    info!(file = %file.name, pages = %pages, count = pages.len(), "extracted pages");

    Ok(package(
        vec![extracted],
        &NamingPolicy::Single(EXTRACTED_NAME.to_string()),
        |doc| backend.serialize(doc),
    )?)
}

/// Split `file` into one document per page or per range.
pub async fn split<B: DocumentBackend>(
    backend: &B,
    file: &SourceFile,
    mode: &SplitMode,
    progress: &dyn ProgressReporter,
) -> Result<OutputArtifact, OperationError> {
    let document = load(backend, file)?;
    let partition = plan_split(mode, backend.page_count(&document))?;

    let parts = partition.parts().len();
    let mut outputs = Vec::with_capacity(parts);
    for (index, pages) in partition.parts().iter().enumerate() {
        let part_progress = Scaled::part(progress, index, parts);
        let plan = AssemblyPlan::extract(&document, pages);
        outputs.push(assemble(backend, plan, &part_progress).await?);
    }

    let naming = match mode {
        SplitMode::All => NamingPolicy::PerPage,
        SplitMode::Ranges(_) => NamingPolicy::Ranges,
    };
    let artifact = package(outputs, &naming, |doc| backend.serialize(doc))?;
    info!(file = %file.name, parts, bundle = artifact.name(), "split document");
    Ok(artifact)
}

/// Rebuild `file` with its pages in the order given by `order`. Pages that
/// are not named are left out.
pub async fn organize<B: DocumentBackend>(
    backend: &B,
    file: &SourceFile,
    order: &str,
    progress: &dyn ProgressReporter,
) -> Result<OutputArtifact, OperationError> {
    let selector = PageSelector::parse(order)?;
    let document = load(backend, file)?;
    let order = selector.resolve_order(backend.page_count(&document))?;

    let organized = assemble(backend, AssemblyPlan::reorder(&document, &order), progress).await?;
    info!(file = %file.name, order = %order, count = order.len(), "reordered pages");

    Ok(package(
        vec![organized],
        &NamingPolicy::Single(ORGANIZED_NAME.to_string()),
        |doc| backend.serialize(doc),
    )?)
}
