use super::read_source;
use crate::operations;
use crate::pdf::Lopdf;
use crate::plan::SplitMode;
use crate::progress::TerminalProgress;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Where the parts of a split go.
pub enum Destination {
    Archive(PathBuf),
    Directory(PathBuf),
}

pub async fn run<P: AsRef<Path>>(
    input: P,
    ranges: Vec<String>,
    destination: &Destination,
) -> Result<()> {
    let source = read_source(input.as_ref())?;
    let mode = if ranges.is_empty() {
        SplitMode::All
    } else {
        SplitMode::Ranges(ranges)
    };

    let progress = TerminalProgress::new("Splitting");
    let result = operations::split(&Lopdf, &source, &mode, &progress).await;
    progress.finish();
    let artifact = result?;
    let parts = artifact.files().len();

    match destination {
        Destination::Archive(path) => {
            artifact
                .write_to(path)
                .with_context(|| format!("Failed to write archive: {}", path.display()))?;
            println!("Split into {} files in {}", parts, path.display());
        }
        Destination::Directory(dir) => {
            artifact
                .write_to_dir(dir)
                .with_context(|| format!("Failed to write into directory: {}", dir.display()))?;
            println!("Split into {} files in {}", parts, dir.display());
        }
    }

    Ok(())
}
