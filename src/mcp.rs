use anyhow::{Context, Result};
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::OperationError;
use crate::operations::{self, SourceFile};
use crate::output::OutputArtifact;
use crate::pdf::{DocumentInfo, Lopdf, PagedDocument};
use crate::plan::SplitMode;
use crate::progress::NoProgress;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfExtractRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Pages to copy (e.g., '1,3,5-10' or '4-end')")]
    pub pages: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfMergeRequest {
    #[schemars(description = "Paths of the PDF files to merge, in order")]
    pub inputs: Vec<String>,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "Path to the PDF file to split")]
    pub path: String,
    #[schemars(
        description = "One page range per output file (e.g., ['1-3', '4-end']). Omit to split every page into its own file."
    )]
    #[serde(default)]
    pub ranges: Vec<String>,
    #[schemars(description = "Directory to write the parts into")]
    pub output_dir: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfOrganizeRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(
        description = "New page order (e.g., '3,1,2', or 'end-1' to reverse). Pages left out are dropped."
    )]
    pub order: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfServer {
    #[tool(
        description = "Get the page count and metadata (title, author, creator, producer, creation date) of a PDF"
    )]
    async fn pdf_info(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        respond(inspect(&path))
    }

    #[tool(description = "Copy selected pages of a PDF, in page order, into a new file")]
    async fn pdf_extract(&self, Parameters(req): Parameters<PdfExtractRequest>) -> String {
        let result = async {
            let source = read_source(&req.path)?;
            let artifact = operations::extract(&Lopdf, &source, &req.pages, &NoProgress).await;
            write_file(artifact, &req.output)
        };
        respond(result.await)
    }

    #[tool(description = "Merge several PDFs into one file, keeping the order given")]
    async fn pdf_merge(&self, Parameters(req): Parameters<PdfMergeRequest>) -> String {
        let result = async {
            let sources = req
                .inputs
                .iter()
                .map(read_source)
                .collect::<Result<Vec<_>>>()?;
            let artifact = operations::merge(&Lopdf, &sources, &NoProgress).await;
            write_file(artifact, &req.output)
        };
        respond(result.await)
    }

    #[tool(
        description = "Split a PDF into one file per page, or one file per page range, written into a directory as page-N.pdf or split-N.pdf"
    )]
    async fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        let result = async {
            let source = read_source(&req.path)?;
            let mode = if req.ranges.is_empty() {
                SplitMode::All
            } else {
                SplitMode::Ranges(req.ranges.clone())
            };
            let artifact = operations::split(&Lopdf, &source, &mode, &NoProgress)
                .await
                .map_err(describe)?;
            let written = artifact
                .write_to_dir(&req.output_dir)
                .with_context(|| format!("Failed to write into {}", req.output_dir))?;
            Ok(WriteResult::new(written))
        };
        respond(result.await)
    }

    #[tool(
        description = "Rearrange the pages of a PDF into a new file; pages left out of the order are dropped"
    )]
    async fn pdf_organize(&self, Parameters(req): Parameters<PdfOrganizeRequest>) -> String {
        let result = async {
            let source = read_source(&req.path)?;
            let artifact = operations::organize(&Lopdf, &source, &req.order, &NoProgress).await;
            write_file(artifact, &req.output)
        };
        respond(result.await)
    }
}

fn inspect(path: &str) -> Result<PdfInfoResult> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;
    let doc = PagedDocument::load_mem(&bytes)
        .with_context(|| format!("Failed to open PDF: {}", path))?;
    Ok(PdfInfoResult {
        path: path.to_string(),
        info: doc.info(),
    })
}

fn read_source<P: AsRef<Path>>(path: P) -> Result<SourceFile> {
    let path = path.as_ref();
    SourceFile::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Keep the user-facing category in front of the detailed cause.
fn describe(err: OperationError) -> anyhow::Error {
    anyhow::anyhow!("{}: {}", err.user_message(), err)
}

fn write_file(
    artifact: std::result::Result<OutputArtifact, OperationError>,
    output: &str,
) -> Result<WriteResult> {
    let artifact = artifact.map_err(describe)?;
    artifact
        .write_to(output)
        .with_context(|| format!("Failed to save {}", output))?;
    Ok(WriteResult::new(vec![PathBuf::from(output)]))
}

fn respond<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("Error: {}", e))
        }
        Err(e) => {
            warn!("tool call failed: {:#}", e);
            format!("Error: {:#}", e)
        }
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize)]
pub struct PdfInfoResult {
    pub path: String,
    #[serde(flatten)]
    pub info: DocumentInfo,
}

#[derive(Debug, Serialize)]
pub struct WriteResult {
    pub output_paths: Vec<String>,
    pub file_count: usize,
}

impl WriteResult {
    fn new(paths: Vec<PathBuf>) -> Self {
        WriteResult {
            file_count: paths.len(),
            output_paths: paths.iter().map(|p| p.display().to_string()).collect(),
        }
    }
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF page tools. Use pdf_info to get the page count and metadata, pdf_extract to \
                 copy selected pages into a new file, pdf_merge to combine files, pdf_split to \
                 break a file into per-page or per-range files, and pdf_organize to reorder or \
                 drop pages. Page selectors look like '1,3,5-10' and may use 'end'."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();
    info!("serving MCP over stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
