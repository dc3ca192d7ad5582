//! `clipdl scan [root] [output]` – list numerically named files, optionally
//! merging them into the download records.

use anyhow::Result;
use clipdl_core::records::RecordStore;
use clipdl_core::scan::{self, ScanDepth};
use std::path::Path;

pub async fn run_scan(
    root: &Path,
    output: &Path,
    depth: ScanDepth,
    merge_into: Option<&RecordStore>,
) -> Result<()> {
    let names = scan::collect_numeric_files(root, depth, Some(output))?;
    scan::write_results(output, &names)?;
    println!("Collected {} file(s).", names.len());
    println!("Output saved to {}", output.display());

    if let Some(records) = merge_into {
        let mut merged = records.list().await?;
        let before = merged.len();
        merged.extend(names);
        let stored = records.replace_all(merged).await?;
        println!(
            "Merged into download records: {} new, {} total",
            stored.len() - before,
            stored.len()
        );
    }
    Ok(())
}
