use super::read_source;
use crate::operations;
use crate::pdf::Lopdf;
use crate::progress::TerminalProgress;
use anyhow::{Context, Result};
use std::path::Path;

pub async fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, order: &str, output: Q) -> Result<()> {
    let output = output.as_ref();
    let source = read_source(input.as_ref())?;

    let progress = TerminalProgress::new("Reordering");
    let result = operations::organize(&Lopdf, &source, order, &progress).await;
    progress.finish();
    let artifact = result?;

    artifact
        .write_to(output)
        .with_context(|| format!("Failed to save PDF: {}", output.display()))?;

    println!("Wrote pages in order {} to {}", order, output.display());

    Ok(())
}
