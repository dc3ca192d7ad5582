//! Batch counters and the final summary.

use crate::controller::SkipReason;

/// How one batch item ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Succeeded,
    Skipped(SkipReason),
    Failed(String),
    TimedOut(String),
    /// Never submitted because the batch was aborted.
    Cancelled,
}

impl ItemOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ItemOutcome::Failed(_) | ItemOutcome::TimedOut(_))
    }
}

/// Running counters of one batch. Terminal when `completed == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchProgress {
    pub total: usize,
    pub completed: usize,
    pub started: usize,
    /// Sticky: stays true once any item failed or timed out.
    pub has_error: bool,
}

impl BatchProgress {
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Overall result of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// No candidates were given.
    Empty,
    AllSucceeded,
    CompletedWithFailures,
    /// Aborted before every item was submitted.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub status: BatchStatus,
    pub total: usize,
    pub completed: usize,
    pub started: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub cancelled: usize,
    pub has_error: bool,
}

/// Bookkeeping for one batch run.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    progress: BatchProgress,
    succeeded: usize,
    skipped: usize,
    failed: usize,
    timed_out: usize,
    cancelled: usize,
}

impl Tally {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            progress: BatchProgress {
                total,
                ..BatchProgress::default()
            },
            ..Self::default()
        }
    }

    pub(crate) fn progress(&self) -> BatchProgress {
        self.progress
    }

    pub(crate) fn record_started(&mut self) {
        self.progress.started += 1;
    }

    /// Counts one terminal outcome. Each item must be counted exactly once.
    pub(crate) fn record_outcome(&mut self, outcome: &ItemOutcome) {
        self.progress.completed += 1;
        match outcome {
            ItemOutcome::Succeeded => self.succeeded += 1,
            ItemOutcome::Skipped(_) => self.skipped += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
            ItemOutcome::TimedOut(_) => self.timed_out += 1,
            ItemOutcome::Cancelled => self.cancelled += 1,
        }
        if outcome.is_failure() {
            self.progress.has_error = true;
        }
    }

    pub(crate) fn summary(&self) -> BatchSummary {
        let p = self.progress;
        let status = if p.total == 0 {
            BatchStatus::Empty
        } else if self.cancelled > 0 {
            BatchStatus::Cancelled
        } else if p.has_error {
            BatchStatus::CompletedWithFailures
        } else {
            BatchStatus::AllSucceeded
        };
        BatchSummary {
            status,
            total: p.total,
            completed: p.completed,
            started: p.started,
            succeeded: self.succeeded,
            skipped: self.skipped,
            failed: self.failed,
            timed_out: self.timed_out,
            cancelled: self.cancelled,
            has_error: p.has_error,
        }
    }
}
