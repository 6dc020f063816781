pub mod extract;
pub mod info;
pub mod merge;
pub mod organize;
pub mod split;

use crate::operations::SourceFile;
use anyhow::{Context, Result};
use std::path::Path;

fn read_source(path: &Path) -> Result<SourceFile> {
    SourceFile::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
