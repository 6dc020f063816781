mod assemble;
mod cli;
mod commands;
mod error;
mod mcp;
mod operations;
mod output;
mod page_range;
mod pdf;
mod plan;
mod progress;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `pagesmith=debug`.
const LOG_ENV: &str = "PAGESMITH_LOG";

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("pagesmith={}", level)));

    // stdout belongs to command output and the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Info { path } => {
            commands::info::run(&path)?;
        }
        Commands::Extract {
            path,
            pages,
            output,
        } => {
            commands::extract::run(&path, &pages, &output).await?;
        }
        Commands::Merge { inputs, output } => {
            commands::merge::run(&inputs, &output).await?;
        }
        Commands::Split {
            path,
            ranges,
            output,
            output_dir,
        } => {
            let destination = match (output, output_dir) {
                (_, Some(dir)) => commands::split::Destination::Directory(dir),
                (Some(archive), None) => commands::split::Destination::Archive(archive),
                (None, None) => anyhow::bail!("split needs --output or --output-dir"),
            };
            commands::split::run(&path, ranges, &destination).await?;
        }
        Commands::Organize {
            path,
            order,
            output,
        } => {
            commands::organize::run(&path, &order, &output).await?;
        }
    }

    Ok(())
}
