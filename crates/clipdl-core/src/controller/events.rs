//! Events and submission results of the single-item controller.

use tokio::sync::mpsc;

use crate::naming::CanonicalId;

/// Why an item was not submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The canonical id is already in the record store.
    AlreadyDownloaded,
    /// Another trigger is transferring the same canonical id right now.
    InFlight,
}

/// Lifecycle event of one download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    Skipped { id: CanonicalId, reason: SkipReason },
    Started { id: CanonicalId },
    Succeeded { id: CanonicalId },
    Failed { id: CanonicalId, reason: String },
    /// Consumers that do not distinguish timeouts treat this like `Failed`.
    TimedOut { id: CanonicalId, reason: String },
}

impl DownloadEvent {
    pub fn id(&self) -> &str {
        match self {
            DownloadEvent::Skipped { id, .. }
            | DownloadEvent::Started { id }
            | DownloadEvent::Succeeded { id }
            | DownloadEvent::Failed { id, .. }
            | DownloadEvent::TimedOut { id, .. } => id,
        }
    }

    /// True for every event that ends an attempt (everything except `Started`).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DownloadEvent::Started { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DownloadEvent::Failed { .. } | DownloadEvent::TimedOut { .. }
        )
    }
}

/// Immediate result of [`Downloader::download`](super::Downloader::download).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    AlreadyDownloaded,
    InFlight,
    /// Transfer submitted; the outcome arrives later as an event.
    Started,
    /// The record store could not be read; a `Failed` event was emitted.
    Rejected,
}

pub type EventSender = mpsc::UnboundedSender<DownloadEvent>;
