use super::read_source;
use crate::operations;
use crate::pdf::Lopdf;
use crate::progress::TerminalProgress;
use anyhow::{Context, Result};
use std::path::Path;

pub async fn run<P: AsRef<Path>, Q: AsRef<Path>>(inputs: &[P], output: Q) -> Result<()> {
    let output = output.as_ref();
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    let sources = inputs
        .iter()
        .map(|input| read_source(input.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let progress = TerminalProgress::new("Merging");
    let result = operations::merge(&Lopdf, &sources, &progress).await;
    progress.finish();
    let artifact = result?;

    artifact
        .write_to(output)
        .with_context(|| format!("Failed to save merged PDF: {}", output.display()))?;

    println!("Merged {} files into {}", inputs.len(), output.display());

    Ok(())
}
