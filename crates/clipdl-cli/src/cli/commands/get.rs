//! `clipdl get <locator>` – download one item unless it is already recorded.

use anyhow::{bail, Result};
use clipdl_core::controller::{DownloadEvent, Downloader, SkipReason};
use clipdl_core::records::RecordStore;
use clipdl_core::transfer::Transfer;
use std::sync::Arc;

pub async fn run_get(records: RecordStore, transfer: Arc<dyn Transfer>, locator: &str) -> Result<()> {
    let downloader = Downloader::new(records, transfer);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let submission = downloader.download(locator, &tx).await;
    tracing::debug!(?submission, "submitted");
    drop(tx);

    while let Some(event) = rx.recv().await {
        match event {
            DownloadEvent::Started { id } => println!("Downloading {id}"),
            DownloadEvent::Succeeded { id } => println!("Saved {id}"),
            DownloadEvent::Skipped {
                id,
                reason: SkipReason::AlreadyDownloaded,
            } => println!("Skipped {id}: already downloaded"),
            DownloadEvent::Skipped {
                id,
                reason: SkipReason::InFlight,
            } => println!("Skipped {id}: already downloading"),
            DownloadEvent::Failed { id, reason } => bail!("download of {id} failed: {reason}"),
            DownloadEvent::TimedOut { id, reason } => bail!("download of {id} timed out: {reason}"),
        }
    }
    Ok(())
}
