//! CLI for the clipdl download orchestrator.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clipdl_core::config::{self, ClipdlConfig};
use clipdl_core::kv::SqliteKv;
use clipdl_core::records::RecordStore;
use clipdl_core::scan::{ScanDepth, DEFAULT_SCAN_OUTPUT};
use clipdl_core::transfer::CurlTransfer;
use std::path::PathBuf;
use std::sync::Arc;

use commands::{
    run_batch, run_derive, run_get, run_records, run_scan, BatchSource, RecordsAction,
};

/// Top-level CLI for clipdl.
#[derive(Debug, Parser)]
#[command(name = "clipdl")]
#[command(about = "clipdl: deduplicating video clip downloader", long_about = None)]
pub struct Cli {
    /// Directory finished downloads are written to (default: config, then current directory).
    #[arg(long, global = true, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Record database path (default: config, then ~/.local/state/clipdl/records.db).
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download one locator unless it was downloaded before.
    Get {
        /// Media locator (URL) as found on the page.
        locator: String,
    },

    /// Download every candidate from a locator list or saved HTML page.
    Batch {
        /// Input file; `-` or omitted reads stdin.
        #[arg(long, value_name = "FILE")]
        from: Option<String>,
        /// Treat the input as an HTML document and collect its MP4 video sources.
        #[arg(long)]
        html: bool,
        /// Base URL for resolving relative sources in --html mode.
        #[arg(long, value_name = "URL", requires = "html")]
        base: Option<String>,
        /// Milliseconds between submissions (default from config).
        #[arg(long, value_name = "MS")]
        stagger_ms: Option<u64>,
    },

    /// Show the transfer locator and canonical file name for a locator.
    Derive {
        locator: String,
    },

    /// Inspect or edit the download records.
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },

    /// Collect numerically named files from a directory into a list.
    Scan {
        /// Directory to scan.
        #[arg(default_value = ".")]
        root: PathBuf,
        /// Output file.
        #[arg(default_value = DEFAULT_SCAN_OUTPUT)]
        output: PathBuf,
        /// Scan only the top-level directory.
        #[arg(long, visible_aliases = ["shallow", "top"])]
        flat: bool,
        /// Also add the collected names to the download records.
        #[arg(long)]
        merge: bool,
    },
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get { ref locator } => {
                let records = open_records(&cfg, cli.db.as_ref()).await?;
                let transfer = curl_transfer(&cfg, cli.download_dir.as_ref())?;
                run_get(records, transfer, locator).await?;
            }
            CliCommand::Batch {
                ref from,
                html,
                ref base,
                stagger_ms,
            } => {
                let records = open_records(&cfg, cli.db.as_ref()).await?;
                let transfer = curl_transfer(&cfg, cli.download_dir.as_ref())?;
                let source = BatchSource {
                    from: from.clone(),
                    html,
                    base: base.clone(),
                };
                let stagger = stagger_ms
                    .map(std::time::Duration::from_millis)
                    .unwrap_or_else(|| cfg.stagger());
                run_batch(records, transfer, stagger, &source).await?;
            }
            CliCommand::Derive { ref locator } => run_derive(locator),
            CliCommand::Records { ref action } => {
                let records = open_records(&cfg, cli.db.as_ref()).await?;
                run_records(&records, action).await?;
            }
            CliCommand::Scan {
                ref root,
                ref output,
                flat,
                merge,
            } => {
                let depth = if flat {
                    ScanDepth::TopLevel
                } else {
                    ScanDepth::Recursive
                };
                let records = if merge {
                    Some(open_records(&cfg, cli.db.as_ref()).await?)
                } else {
                    None
                };
                run_scan(root, output, depth, records.as_ref()).await?;
            }
        }

        Ok(())
    }
}

async fn open_records(cfg: &ClipdlConfig, db: Option<&PathBuf>) -> Result<RecordStore> {
    let kv = match db.or(cfg.database_path.as_ref()) {
        Some(path) => SqliteKv::open_at(path)
            .await
            .with_context(|| format!("open record database {}", path.display()))?,
        None => SqliteKv::open_default().await?,
    };
    Ok(RecordStore::new(Arc::new(kv), cfg.records_key.clone()))
}

fn curl_transfer(cfg: &ClipdlConfig, download_dir: Option<&PathBuf>) -> Result<Arc<CurlTransfer>> {
    let dir = match download_dir.or(cfg.download_dir.as_ref()) {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    Ok(Arc::new(CurlTransfer::new(dir, cfg.transfer.clone())))
}

#[cfg(test)]
mod tests;
