//! Batch scheduler: many single-item downloads, staggered, with aggregate
//! completion detection.
//!
//! Every candidate is derived and checked against the record store before
//! anything is submitted. Recorded items resolve immediately; the rest are
//! handed to the controller one per dispatcher tick. Each item reaches exactly
//! one terminal outcome, and the batch finalizes once, when all have.

mod dispatch;
mod progress;
mod watch;

pub use progress::{BatchProgress, BatchStatus, BatchSummary, ItemOutcome};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::control::BatchControl;
use crate::controller::{DownloadEvent, Downloader, SkipReason, Submission};
use crate::discovery::{Candidate, DiscoveryFeed};
use crate::naming::{self, CanonicalId};
use dispatch::Dispatcher;
use progress::Tally;
use watch::Watchers;

/// Progress notifications of one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// The candidate list was empty.
    NothingToDo,
    ItemStarted {
        index: usize,
        id: CanonicalId,
        handle: Option<String>,
    },
    ItemFinished {
        index: usize,
        id: CanonicalId,
        handle: Option<String>,
        outcome: ItemOutcome,
        progress: BatchProgress,
    },
    /// Sent exactly once, last.
    Finished(BatchSummary),
}

pub type BatchEventSender = mpsc::UnboundedSender<BatchEvent>;

/// Runs batches over a shared [`Downloader`].
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    downloader: Downloader,
    stagger: Duration,
    control: Option<Arc<BatchControl>>,
    next_id: Arc<AtomicU64>,
}

struct Item {
    index: usize,
    id: CanonicalId,
    candidate: Candidate,
}

impl BatchScheduler {
    pub fn new(downloader: Downloader, stagger: Duration) -> Self {
        Self {
            downloader,
            stagger,
            control: None,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register every batch with `control` so it can be aborted.
    pub fn with_control(mut self, control: Arc<BatchControl>) -> Self {
        self.control = Some(control);
        self
    }

    /// Id the next batch will be registered under.
    pub fn next_batch_id(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }

    /// Asks `feed` for its current candidates and runs them as one batch.
    pub async fn run_feed(
        &self,
        feed: &dyn DiscoveryFeed,
        events: Option<&BatchEventSender>,
    ) -> BatchSummary {
        self.run_batch(feed.list_candidates(), events).await
    }

    /// Runs one batch to completion and returns its summary.
    pub async fn run_batch(
        &self,
        candidates: Vec<Candidate>,
        events: Option<&BatchEventSender>,
    ) -> BatchSummary {
        let batch_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut run = Run::new(batch_id, candidates.len(), events);

        if candidates.is_empty() {
            tracing::info!(batch_id, "batch has nothing to do");
            run.emit(BatchEvent::NothingToDo);
            return run.finalize();
        }

        let abort = self.control.as_ref().map(|c| c.register(batch_id));

        let records = self.downloader.records();
        let mut queue = VecDeque::new();
        for (index, candidate) in candidates.into_iter().enumerate() {
            let id = naming::derive(&candidate.locator).canonical_id;
            match records.contains(&id).await {
                Ok(true) => run.finish(
                    index,
                    id,
                    candidate.handle,
                    ItemOutcome::Skipped(SkipReason::AlreadyDownloaded),
                ),
                Ok(false) => queue.push_back(Item {
                    index,
                    id,
                    candidate,
                }),
                Err(e) => {
                    tracing::warn!(batch_id, id = %id, "record store unavailable: {}", e);
                    run.finish(index, id, candidate.handle, ItemOutcome::Failed(e.to_string()));
                }
            }
        }
        tracing::info!(
            batch_id,
            total = run.tally.progress().total,
            pending = queue.len(),
            stagger_ms = self.stagger.as_millis() as u64,
            "batch classified"
        );

        let mut dispatcher = Dispatcher::new(self.stagger);
        let mut watchers = Watchers::new();

        while !run.tally.progress().is_done() {
            if is_aborted(abort.as_deref()) && !queue.is_empty() {
                tracing::info!(batch_id, remaining = queue.len(), "batch aborted");
                while let Some(item) = queue.pop_front() {
                    run.finish(item.index, item.id, item.candidate.handle, ItemOutcome::Cancelled);
                }
                continue;
            }

            tokio::select! {
                biased;
                settled = watchers.next(), if !watchers.is_empty() => {
                    if let Some((item, outcome)) = settled {
                        run.finish(item.index, item.id, item.candidate.handle, outcome);
                    }
                }
                _ = dispatcher.tick(), if !queue.is_empty() => {
                    if is_aborted(abort.as_deref()) {
                        continue;
                    }
                    let Some(item) = queue.pop_front() else { continue };
                    self.dispatch(item, &mut run, &mut watchers).await;
                }
                else => break,
            }
        }

        if let Some(control) = &self.control {
            control.unregister(batch_id);
        }
        run.finalize()
    }

    async fn dispatch(
        &self,
        item: Item,
        run: &mut Run<'_>,
        watchers: &mut Watchers,
    ) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tracing::debug!(batch_id = run.batch_id, index = item.index, id = %item.id, "dispatching");
        let submission = self.downloader.download(&item.candidate.locator, &tx).await;
        drop(tx);

        if submission != Submission::Started {
            let outcome = match rx.try_recv() {
                Ok(event) => outcome_of(event),
                Err(_) => fallback_outcome(submission),
            };
            run.finish(item.index, item.id, item.candidate.handle, outcome);
            return;
        }

        run.tally.record_started();
        run.emit(BatchEvent::ItemStarted {
            index: item.index,
            id: item.id.clone(),
            handle: item.candidate.handle.clone(),
        });
        watchers.watch(item, async move {
            loop {
                match rx.recv().await {
                    Some(DownloadEvent::Started { .. }) => continue,
                    Some(event) => return outcome_of(event),
                    None => return ItemOutcome::Failed("transfer ended without an outcome".into()),
                }
            }
        });
    }
}

fn is_aborted(token: Option<&AtomicBool>) -> bool {
    token.is_some_and(|t| t.load(Ordering::Relaxed))
}

fn outcome_of(event: DownloadEvent) -> ItemOutcome {
    match event {
        DownloadEvent::Skipped { reason, .. } => ItemOutcome::Skipped(reason),
        DownloadEvent::Succeeded { .. } => ItemOutcome::Succeeded,
        DownloadEvent::Failed { reason, .. } => ItemOutcome::Failed(reason),
        DownloadEvent::TimedOut { reason, .. } => ItemOutcome::TimedOut(reason),
        DownloadEvent::Started { .. } => ItemOutcome::Failed("no terminal outcome".into()),
    }
}

fn fallback_outcome(submission: Submission) -> ItemOutcome {
    match submission {
        Submission::AlreadyDownloaded => ItemOutcome::Skipped(SkipReason::AlreadyDownloaded),
        Submission::InFlight => ItemOutcome::Skipped(SkipReason::InFlight),
        Submission::Rejected | Submission::Started => {
            ItemOutcome::Failed("record store unavailable".into())
        }
    }
}

/// Per-run state: counters plus the optional event sink.
struct Run<'a> {
    batch_id: u64,
    tally: Tally,
    events: Option<&'a BatchEventSender>,
}

impl<'a> Run<'a> {
    fn new(batch_id: u64, total: usize, events: Option<&'a BatchEventSender>) -> Self {
        Self {
            batch_id,
            tally: Tally::new(total),
            events,
        }
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(tx) = self.events {
            let _ = tx.send(event);
        }
    }

    fn finish(
        &mut self,
        index: usize,
        id: CanonicalId,
        handle: Option<String>,
        outcome: ItemOutcome,
    ) {
        self.tally.record_outcome(&outcome);
        match &outcome {
            ItemOutcome::Failed(reason) | ItemOutcome::TimedOut(reason) => {
                tracing::warn!(batch_id = self.batch_id, index, id = %id, "item failed: {}", reason)
            }
            _ => tracing::debug!(batch_id = self.batch_id, index, id = %id, ?outcome, "item finished"),
        }
        self.emit(BatchEvent::ItemFinished {
            index,
            id,
            handle,
            outcome,
            progress: self.tally.progress(),
        });
    }

    fn finalize(self) -> BatchSummary {
        let summary = self.tally.summary();
        tracing::info!(
            batch_id = self.batch_id,
            total = summary.total,
            succeeded = summary.succeeded,
            skipped = summary.skipped,
            failed = summary.failed + summary.timed_out,
            cancelled = summary.cancelled,
            status = ?summary.status,
            "batch finished"
        );
        self.emit(BatchEvent::Finished(summary));
        summary
    }
}
