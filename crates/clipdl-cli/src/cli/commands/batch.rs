//! `clipdl batch` – download every candidate from a list or saved page.
//!
//! Ctrl-C stops dispatching: items not yet submitted are cancelled, running
//! transfers finish.

use anyhow::{bail, Context, Result};
use clipdl_core::batch::{BatchEvent, BatchScheduler, BatchStatus, ItemOutcome};
use clipdl_core::control::BatchControl;
use clipdl_core::controller::{Downloader, SkipReason};
use clipdl_core::discovery::{DiscoveryFeed, HtmlDocumentFeed, LocatorListFeed};
use clipdl_core::records::RecordStore;
use clipdl_core::transfer::Transfer;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;

/// Where batch candidates come from.
#[derive(Debug, Clone, Default)]
pub struct BatchSource {
    /// File path; `None` or `-` means stdin.
    pub from: Option<String>,
    pub html: bool,
    pub base: Option<String>,
}

impl BatchSource {
    async fn read_input(&self) -> Result<String> {
        match self.from.as_deref() {
            None | Some("-") => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .context("read stdin")?;
                Ok(text)
            }
            Some(path) => tokio::fs::read_to_string(Path::new(path))
                .await
                .with_context(|| format!("read {}", path)),
        }
    }

    pub(crate) fn feed(&self, text: String) -> Result<Box<dyn DiscoveryFeed>> {
        if !self.html {
            return Ok(Box::new(LocatorListFeed::from_text(text)));
        }
        let base = self
            .base
            .as_deref()
            .map(url::Url::parse)
            .transpose()
            .context("invalid --base URL")?;
        Ok(Box::new(HtmlDocumentFeed::new(text, base)))
    }
}

pub async fn run_batch(
    records: RecordStore,
    transfer: Arc<dyn Transfer>,
    stagger: Duration,
    source: &BatchSource,
) -> Result<()> {
    let feed = source.feed(source.read_input().await?)?;

    let control = Arc::new(BatchControl::new());
    let scheduler =
        BatchScheduler::new(Downloader::new(records, transfer), stagger).with_control(Arc::clone(&control));

    let interrupt = {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Interrupted: cancelling items not yet started");
                control.abort_all();
            }
        })
    };

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            print_event(&event);
        }
    });

    let summary = scheduler.run_feed(feed.as_ref(), Some(&tx)).await;
    drop(tx);
    let _ = printer.await;
    interrupt.abort();

    match summary.status {
        BatchStatus::Empty | BatchStatus::AllSucceeded => Ok(()),
        BatchStatus::CompletedWithFailures => bail!(
            "{} of {} item(s) failed",
            summary.failed + summary.timed_out,
            summary.total
        ),
        BatchStatus::Cancelled => bail!("batch cancelled ({} item(s) not started)", summary.cancelled),
    }
}

fn print_event(event: &BatchEvent) {
    match event {
        BatchEvent::NothingToDo => println!("No candidates found; nothing to do."),
        BatchEvent::ItemStarted { id, .. } => println!("  start   {id}"),
        BatchEvent::ItemFinished {
            id,
            outcome,
            progress,
            ..
        } => {
            let label = match outcome {
                ItemOutcome::Succeeded => "saved".to_string(),
                ItemOutcome::Skipped(SkipReason::AlreadyDownloaded) => "skipped (already downloaded)".to_string(),
                ItemOutcome::Skipped(SkipReason::InFlight) => "skipped (already downloading)".to_string(),
                ItemOutcome::Failed(reason) => format!("FAILED: {reason}"),
                ItemOutcome::TimedOut(reason) => format!("TIMED OUT: {reason}"),
                ItemOutcome::Cancelled => "cancelled".to_string(),
            };
            println!("[{}/{}] {id}: {label}", progress.completed, progress.total);
        }
        BatchEvent::Finished(summary) => println!(
            "Done: {} saved, {} skipped, {} failed, {} timed out, {} cancelled ({} total)",
            summary.succeeded,
            summary.skipped,
            summary.failed,
            summary.timed_out,
            summary.cancelled,
            summary.total
        ),
    }
}
