//! Turning assembled documents into files for the user.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackageError, SerializeError};

/// One named file of an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// The deliverable of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputArtifact {
    SingleFile(OutputFile),
    /// Several files, delivered together as a zip archive called `name`.
    Bundle {
        name: String,
        files: Vec<OutputFile>,
    },
}

/// How the documents produced by an operation are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingPolicy {
    /// One document under a fixed name, e.g. `merged-document.pdf`.
    Single(String),
    /// One document per page: `page-1.pdf`, `page-2.pdf`, ...
    PerPage,
    /// One document per requested range: `split-1.pdf`, `split-2.pdf`, ...
    Ranges,
}

impl NamingPolicy {
    fn is_multi_file(&self) -> bool {
        !matches!(self, NamingPolicy::Single(_))
    }

    /// Name of the `n`-th (1-based) file of a bundle.
    fn entry_name(&self, n: usize) -> String {
        match self {
            NamingPolicy::PerPage => format!("page-{}.pdf", n),
            NamingPolicy::Ranges => format!("split-{}.pdf", n),
            NamingPolicy::Single(name) => {
                let (stem, extension) = split_extension(name);
                format!("{}-{}{}", stem, n, extension)
            }
        }
    }

    fn archive_name(&self) -> String {
        match self {
            NamingPolicy::PerPage => "pages.zip".to_string(),
            NamingPolicy::Ranges => "split.zip".to_string(),
            NamingPolicy::Single(name) => format!("{}.zip", split_extension(name).0),
        }
    }
}

/// Split "report.pdf" into ("report", ".pdf").
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    }
}

/// Serialize `results` and decide whether they go out as one file or a bundle.
///
/// Multi-file policies always produce a bundle, even for a single result, so
/// a split is delivered the same way however many parts it has.
pub fn package<D, F>(
    results: Vec<D>,
    naming: &NamingPolicy,
    mut serialize: F,
) -> Result<OutputArtifact, PackageError>
where
    F: FnMut(&mut D) -> Result<Vec<u8>, SerializeError>,
{
    if results.is_empty() {
        return Err(PackageError::Empty);
    }

    if let (NamingPolicy::Single(name), 1) = (naming, results.len()) {
        let mut document = results.into_iter().next().ok_or(PackageError::Empty)?;
        return Ok(OutputArtifact::SingleFile(OutputFile {
            name: name.clone(),
            bytes: serialize(&mut document)?,
        }));
    }

    let mut files = Vec::with_capacity(results.len());
    for (i, mut document) in results.into_iter().enumerate() {
        files.push(OutputFile {
            name: naming.entry_name(i + 1),
            bytes: serialize(&mut document)?,
        });
    }
    debug!(
        files = files.len(),
        multi_file = naming.is_multi_file(),
        "packaged bundle"
    );
    Ok(OutputArtifact::Bundle {
        name: naming.archive_name(),
        files,
    })
}

impl OutputArtifact {
    /// Suggested file name for the download.
    pub fn name(&self) -> &str {
        match self {
            OutputArtifact::SingleFile(file) => &file.name,
            OutputArtifact::Bundle { name, .. } => name,
        }
    }

    pub fn files(&self) -> &[OutputFile] {
        match self {
            OutputArtifact::SingleFile(file) => std::slice::from_ref(file),
            OutputArtifact::Bundle { files, .. } => files,
        }
    }

    /// The bytes to download: the file itself, or a zip archive of the bundle.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PackageError> {
        match self {
            OutputArtifact::SingleFile(file) => Ok(file.bytes.clone()),
            OutputArtifact::Bundle { files, .. } => to_zip(files),
        }
    }

    /// Write the artifact to `path` as a single file or a zip archive.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), PackageError> {
        let bytes = self.to_bytes()?;
        fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Write every file of the artifact into `dir` under its own name.
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>, PackageError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for file in self.files() {
            let path = dir.join(&file.name);
            fs::write(&path, &file.bytes)?;
            written.push(path);
        }
        Ok(written)
    }
}

fn to_zip(files: &[OutputFile]) -> Result<Vec<u8>, PackageError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        writer.start_file(file.name.as_str(), options)?;
        writer.write_all(&file.bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}
