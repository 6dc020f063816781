use thiserror::Error;

/// Failure to turn a page selector into pages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("invalid page range: {0:?}")]
    Malformed(String),

    #[error("no pages selected")]
    EmptySelection,
}

/// The input bytes could not be decoded as a paged document.
#[derive(Error, Debug, Clone)]
#[error("could not read file: {reason}")]
pub struct DocumentLoadError {
    pub reason: String,
}

/// A single page could not be copied by the document backend.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct CopyError(pub String);

/// A document could not be turned back into bytes.
#[derive(Error, Debug, Clone)]
#[error("failed to serialize document: {0}")]
pub struct SerializeError(pub String);

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("failed to copy page {page} of input {input}: {reason}")]
    CopyFailed {
        input: usize,
        page: u32,
        reason: String,
    },

    #[error("nothing to assemble")]
    EmptyPlan,
}

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("no documents to package")]
    Empty,

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything that can abort a user-triggered operation.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("no input files specified")]
    NoInputs,

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("{name}: {source}")]
    Load {
        name: String,
        #[source]
        source: DocumentLoadError,
    },

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Package(#[from] PackageError),
}

impl OperationError {
    /// Short message suitable for showing to the person who triggered the operation.
    pub fn user_message(&self) -> &'static str {
        match self {
            OperationError::NoInputs => "no files selected",
            OperationError::Selector(SelectorError::Malformed(_)) => "invalid page range",
            OperationError::Selector(SelectorError::EmptySelection) => "no pages selected",
            OperationError::Load { .. } => "could not read file",
            OperationError::Assembly(_) => "could not assemble the document",
            OperationError::Package(_) => "could not package the result",
        }
    }
}
