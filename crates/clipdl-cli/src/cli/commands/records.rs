//! `clipdl records ...` – view and edit the set of downloaded ids.
//!
//! Editing records never touches files on disk.

use anyhow::{Context, Result};
use clap::Subcommand;
use clipdl_core::records::{apply_bulk_edit, RecordStore};
use tokio::io::AsyncReadExt;

#[derive(Debug, Subcommand)]
pub enum RecordsAction {
    /// Print every recorded id, one per line.
    List,
    /// Mark ids as downloaded.
    Add {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Forget one id so it will be downloaded again.
    Remove { id: String },
    /// Forget every id.
    Clear,
    /// Replace all records with the lines of a file (`-` or omitted reads stdin).
    Import {
        #[arg(value_name = "FILE")]
        path: Option<String>,
    },
    /// Print the records in import format.
    Export,
}

pub async fn run_records(records: &RecordStore, action: &RecordsAction) -> Result<()> {
    match action {
        RecordsAction::List => {
            let ids = records.list().await?;
            if ids.is_empty() {
                println!("No download records.");
            }
            for id in ids {
                println!("{id}");
            }
        }
        RecordsAction::Add { ids } => {
            for id in ids {
                records.add(id).await?;
            }
            println!("Recorded {} id(s)", ids.len());
        }
        RecordsAction::Remove { id } => {
            if records.remove(id).await? {
                println!("Removed {id}");
            } else {
                println!("{id} was not recorded");
            }
        }
        RecordsAction::Clear => {
            records.clear().await?;
            println!("Cleared download records");
        }
        RecordsAction::Import { path } => {
            let text = read_text(path.as_deref()).await?;
            let stored = apply_bulk_edit(records, &text).await?;
            let count = stored.lines().count();
            println!("{stored}");
            eprintln!("Stored {count} record(s)");
        }
        RecordsAction::Export => {
            let ids = records.list().await?;
            if !ids.is_empty() {
                println!("{}", ids.join("\n"));
            }
        }
    }
    Ok(())
}

async fn read_text(path: Option<&str>) -> Result<String> {
    match path {
        None | Some("-") => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("read stdin")?;
            Ok(text)
        }
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read {}", path)),
    }
}
