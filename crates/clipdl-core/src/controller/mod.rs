//! Single-item download controller.
//!
//! Drives one locator through derive → dedup check → transfer → record. The
//! controller never returns an error: every outcome is a [`DownloadEvent`].
//! `Started` is always sent before the terminal event of the same attempt, and
//! on success the record is written before `Succeeded` is sent.

mod events;
mod in_flight;

pub use events::{DownloadEvent, EventSender, SkipReason, Submission};

use std::sync::Arc;

use crate::naming::{self, CanonicalId};
use crate::records::RecordStore;
use crate::transfer::{Transfer, TransferError, TransferRequest};
use in_flight::{InFlightGuard, InFlightSet};

/// Shared download controller. Clones share the record store, the transfer
/// backend, and the in-flight set, so overlapping triggers coalesce.
#[derive(Clone)]
pub struct Downloader {
    records: RecordStore,
    transfer: Arc<dyn Transfer>,
    in_flight: InFlightSet,
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

impl Downloader {
    pub fn new(records: RecordStore, transfer: Arc<dyn Transfer>) -> Self {
        Self {
            records,
            transfer,
            in_flight: InFlightSet::default(),
        }
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Whether a transfer for `id` is currently running.
    pub fn is_in_flight(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    /// Starts downloading `locator`, reporting its lifecycle on `events`.
    ///
    /// Skips (and rejections) are reported before this returns. For
    /// [`Submission::Started`] the transfer runs on a spawned task and its
    /// terminal event arrives later.
    pub async fn download(&self, locator: &str, events: &EventSender) -> Submission {
        let derived = naming::derive(locator);
        let id = derived.canonical_id;
        tracing::debug!(locator, id = %id, "derived canonical id");

        let Some(guard) = self.in_flight.claim(&id) else {
            tracing::debug!(id = %id, "already in flight, coalescing");
            send(events, DownloadEvent::Skipped {
                id,
                reason: SkipReason::InFlight,
            });
            return Submission::InFlight;
        };

        match self.records.contains(&id).await {
            Ok(true) => {
                drop(guard);
                tracing::debug!(id = %id, "already downloaded, skipping");
                send(events, DownloadEvent::Skipped {
                    id,
                    reason: SkipReason::AlreadyDownloaded,
                });
                return Submission::AlreadyDownloaded;
            }
            Ok(false) => {}
            Err(e) => {
                drop(guard);
                tracing::warn!(id = %id, "record store unavailable: {}", e);
                send(events, DownloadEvent::Failed {
                    id,
                    reason: e.to_string(),
                });
                return Submission::Rejected;
            }
        }

        send(events, DownloadEvent::Started { id: id.clone() });

        let request = TransferRequest {
            source: derived.transfer_locator,
            destination_name: id.clone(),
        };
        let records = self.records.clone();
        let transfer = Arc::clone(&self.transfer);
        let events = events.clone();
        tokio::spawn(async move {
            let result = transfer.fetch(&request).await;
            finish(id, result, &records, guard, &events).await;
        });
        Submission::Started
    }
}

async fn finish(
    id: CanonicalId,
    result: Result<(), TransferError>,
    records: &RecordStore,
    guard: InFlightGuard,
    events: &EventSender,
) {
    let event = match result {
        Ok(()) => {
            if let Err(e) = records.add(&id).await {
                tracing::warn!(id = %id, "downloaded but could not record: {}", e);
            }
            tracing::info!(id = %id, "download complete");
            DownloadEvent::Succeeded { id }
        }
        Err(e) if e.is_timeout() => {
            tracing::warn!(id = %id, "download timed out: {}", e);
            DownloadEvent::TimedOut {
                id,
                reason: e.to_string(),
            }
        }
        Err(e) => {
            tracing::warn!(id = %id, "download failed: {}", e);
            DownloadEvent::Failed {
                id,
                reason: e.to_string(),
            }
        }
    };
    drop(guard);
    send(events, event);
}

/// A closed receiver only means nobody is listening any more.
fn send(events: &EventSender, event: DownloadEvent) {
    if events.send(event).is_err() {
        tracing::debug!("download event dropped: receiver closed");
    }
}
