use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pagesmith")]
#[command(about = "Merge, split, extract and reorder PDF pages, with MCP server support")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). PAGESMITH_LOG overrides it.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server over stdio
    Mcp,

    /// Display page count and metadata
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Copy selected pages to a new PDF
    #[command(alias = "cat")]
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        /// Pages to keep (e.g., "1,3,5-10" or "4-end")
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Combine multiple PDFs into one, in the order given
    Merge {
        /// PDF files to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Split a PDF into one file per page, or one file per range
    #[command(alias = "burst")]
    Split {
        /// PDF file to split
        path: PathBuf,

        /// Page range for one output file; repeat for more files. Without it
        /// every page becomes its own file.
        #[arg(short, long = "range", value_name = "PAGES")]
        ranges: Vec<String>,

        /// Write the parts as a zip archive
        #[arg(short, long, required_unless_present = "output_dir")]
        output: Option<PathBuf>,

        /// Write the parts as separate files into this directory
        #[arg(short = 'd', long, conflicts_with = "output")]
        output_dir: Option<PathBuf>,
    },

    /// Rearrange pages; pages left out of the order are dropped
    #[command(alias = "reorder")]
    Organize {
        /// PDF file to rearrange
        path: PathBuf,

        /// New page order (e.g., "3,1,2" or "end-1" to reverse)
        order: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}
