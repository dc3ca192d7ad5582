//! Integration tests: batch scheduler timing, accounting and cancellation.
//!
//! Timing tests run on paused tokio time, so elapsed durations are exact.

mod common;

use std::sync::Arc;
use std::time::Duration;

use clipdl_core::batch::{BatchEvent, BatchScheduler, BatchStatus, BatchSummary, ItemOutcome};
use clipdl_core::control::BatchControl;
use clipdl_core::controller::{Downloader, SkipReason};
use clipdl_core::discovery::{Candidate, LocatorListFeed};
use clipdl_core::records::RecordStore;
use common::scripted::{Script, ScriptedTransfer};
use tokio::sync::mpsc;
use tokio::time::Instant;

fn candidates(names: &[&str]) -> Vec<Candidate> {
    names
        .iter()
        .map(|n| Candidate::with_handle(common::clip_locator(n), *n))
        .collect()
}

fn scheduler(
    records: &RecordStore,
    transfer: &Arc<ScriptedTransfer>,
    stagger_ms: u64,
) -> BatchScheduler {
    let downloader = Downloader::new(records.clone(), transfer.clone());
    BatchScheduler::new(downloader, Duration::from_millis(stagger_ms))
}

async fn run_collecting(
    scheduler: &BatchScheduler,
    items: Vec<Candidate>,
) -> (BatchSummary, Vec<BatchEvent>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let summary = scheduler.run_batch(items, Some(&tx)).await;
    drop(tx);
    let mut events = Vec::new();
    while let Some(ev) = rx.recv().await {
        events.push(ev);
    }
    (summary, events)
}

fn finished_count(events: &[BatchEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, BatchEvent::Finished(_)))
        .count()
}

#[tokio::test(start_paused = true)]
async fn pending_items_are_submitted_at_stagger_intervals() {
    let (_kv, records) = common::memory_records();
    let transfer = ScriptedTransfer::new();
    let scheduler = scheduler(&records, &transfer, 400);

    let start = Instant::now();
    let summary = scheduler
        .run_batch(candidates(&["a.mp4", "b.mp4", "c.mp4"]), None)
        .await;

    let offsets: Vec<Duration> = transfer
        .submitted()
        .iter()
        .map(|s| s.at.duration_since(start))
        .collect();
    assert_eq!(
        offsets,
        vec![
            Duration::ZERO,
            Duration::from_millis(400),
            Duration::from_millis(800)
        ]
    );
    assert_eq!(transfer.submitted_names(), vec!["a.mp4", "b.mp4", "c.mp4"]);
    assert_eq!(summary.status, BatchStatus::AllSucceeded);
    assert_eq!(summary.succeeded, 3);
}

#[tokio::test(start_paused = true)]
async fn recorded_items_do_not_consume_stagger_slots() {
    let (_kv, records) = common::memory_records();
    records.replace_all(["a.mp4", "c.mp4"]).await.unwrap();
    let transfer = ScriptedTransfer::new();
    let scheduler = scheduler(&records, &transfer, 400);

    let start = Instant::now();
    let (summary, events) =
        run_collecting(&scheduler, candidates(&["a.mp4", "b.mp4", "c.mp4", "d.mp4", "e.mp4"])).await;

    assert_eq!(summary.total, 5);
    assert_eq!(summary.completed, 5);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.started, 3);
    assert!(!summary.has_error);
    assert_eq!(summary.status, BatchStatus::AllSucceeded);
    assert_eq!(finished_count(&events), 1);
    assert!(matches!(events.last(), Some(BatchEvent::Finished(s)) if s.completed == 5));

    assert_eq!(transfer.submitted_names(), vec!["b.mp4", "d.mp4", "e.mp4"]);
    let last = transfer.submitted().last().unwrap().at.duration_since(start);
    assert_eq!(last, Duration::from_millis(800));

    for name in ["b.mp4", "d.mp4", "e.mp4"] {
        assert!(records.contains(name).await.unwrap());
    }
}

#[tokio::test(start_paused = true)]
async fn recorded_items_resolve_before_any_submission() {
    let (_kv, records) = common::memory_records();
    records.add("c.mp4").await.unwrap();
    let transfer = ScriptedTransfer::new();
    let scheduler = scheduler(&records, &transfer, 400);

    let (_summary, events) = run_collecting(&scheduler, candidates(&["a.mp4", "c.mp4"])).await;
    match &events[0] {
        BatchEvent::ItemFinished {
            index,
            id,
            handle,
            outcome,
            progress,
        } => {
            assert_eq!(*index, 1);
            assert_eq!(id, "c.mp4");
            assert_eq!(handle.as_deref(), Some("c.mp4"));
            assert_eq!(*outcome, ItemOutcome::Skipped(SkipReason::AlreadyDownloaded));
            assert_eq!(progress.completed, 1);
            assert_eq!(progress.started, 0);
        }
        other => panic!("expected skipped item first, got {:?}", other),
    }
    assert!(matches!(events[1], BatchEvent::ItemStarted { index: 0, .. }));
}

#[tokio::test(start_paused = true)]
async fn single_recorded_item_finalizes_without_waiting() {
    let (_kv, records) = common::memory_records();
    records.add("only.mp4").await.unwrap();
    let transfer = ScriptedTransfer::new();
    let scheduler = scheduler(&records, &transfer, 3_600_000);

    let start = Instant::now();
    let (summary, events) = run_collecting(&scheduler, candidates(&["only.mp4"])).await;

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.status, BatchStatus::AllSucceeded);
    assert_eq!(finished_count(&events), 1);
    assert!(transfer.submitted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn one_failing_item_sets_sticky_error_flag() {
    let (_kv, records) = common::memory_records();
    let transfer = ScriptedTransfer::with_latency(Duration::from_millis(50));
    transfer.script("b.mp4", Script::Fail(500));
    let scheduler = scheduler(&records, &transfer, 100);

    let (summary, events) =
        run_collecting(&scheduler, candidates(&["a.mp4", "b.mp4", "c.mp4"])).await;

    assert!(summary.has_error);
    assert_eq!(summary.status, BatchStatus::CompletedWithFailures);
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert!(!records.contains("b.mp4").await.unwrap());
    assert!(records.contains("c.mp4").await.unwrap());

    let flags: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            BatchEvent::ItemFinished { progress, .. } => Some(progress.has_error),
            _ => None,
        })
        .collect();
    let first_error = flags.iter().position(|f| *f).unwrap();
    assert!(flags[first_error..].iter().all(|f| *f));
}

#[tokio::test(start_paused = true)]
async fn timeouts_count_as_failures() {
    let (_kv, records) = common::memory_records();
    let transfer = ScriptedTransfer::new();
    transfer.script("slow.mp4", Script::Timeout);
    let scheduler = scheduler(&records, &transfer, 0);

    let summary = scheduler
        .run_batch(candidates(&["slow.mp4", "fine.mp4"]), None)
        .await;
    assert_eq!(summary.timed_out, 1);
    assert_eq!(summary.succeeded, 1);
    assert!(summary.has_error);
    assert_eq!(summary.status, BatchStatus::CompletedWithFailures);
}

#[tokio::test]
async fn empty_batch_reports_nothing_to_do() {
    let (_kv, records) = common::memory_records();
    let transfer = ScriptedTransfer::new();
    let scheduler = scheduler(&records, &transfer, 400);

    let (summary, events) = run_collecting(&scheduler, Vec::new()).await;
    assert_eq!(summary.status, BatchStatus::Empty);
    assert_eq!(summary.total, 0);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], BatchEvent::NothingToDo);
    assert!(matches!(events[1], BatchEvent::Finished(_)));
}

#[tokio::test(start_paused = true)]
async fn duplicate_candidates_in_one_batch_coalesce() {
    let (_kv, records) = common::memory_records();
    let transfer = ScriptedTransfer::with_latency(Duration::from_secs(2));
    let scheduler = scheduler(&records, &transfer, 0);

    let summary = scheduler
        .run_batch(candidates(&["same.mp4", "same.mp4"]), None)
        .await;
    assert_eq!(transfer.submitted().len(), 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.status, BatchStatus::AllSucceeded);
}

#[tokio::test(start_paused = true)]
async fn overlapping_batches_keep_independent_counters() {
    let (_kv, records) = common::memory_records();
    let transfer = ScriptedTransfer::with_latency(Duration::from_secs(1));
    let scheduler = scheduler(&records, &transfer, 100);

    let (first, second) = tokio::join!(
        scheduler.run_batch(candidates(&["a.mp4", "b.mp4"]), None),
        scheduler.run_batch(candidates(&["b.mp4", "c.mp4", "d.mp4"]), None),
    );

    assert_eq!((first.total, first.completed), (2, 2));
    assert_eq!((second.total, second.completed), (3, 3));
    let mut names = transfer.submitted_names();
    names.sort();
    assert_eq!(names, vec!["a.mp4", "b.mp4", "c.mp4", "d.mp4"]);
    for name in ["a.mp4", "b.mp4", "c.mp4", "d.mp4"] {
        assert!(records.contains(name).await.unwrap());
    }
}

#[tokio::test(start_paused = true)]
async fn abort_cancels_unsubmitted_items() {
    let (_kv, records) = common::memory_records();
    let transfer = ScriptedTransfer::new();
    let control = Arc::new(BatchControl::new());
    let scheduler = scheduler(&records, &transfer, 1000).with_control(Arc::clone(&control));

    let batch_id = scheduler.next_batch_id();
    let running = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move {
            scheduler
                .run_batch(candidates(&["a.mp4", "b.mp4", "c.mp4", "d.mp4"]), None)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(control.running(), vec![batch_id]);
    assert!(control.request_abort(batch_id));

    let summary = running.await.unwrap();
    assert_eq!(summary.status, BatchStatus::Cancelled);
    assert_eq!(summary.completed, 4);
    assert_eq!(summary.started, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.cancelled, 2);
    assert_eq!(transfer.submitted_names(), vec!["a.mp4", "b.mp4"]);
    assert!(control.running().is_empty());
}

#[tokio::test(start_paused = true)]
async fn feed_candidates_run_as_one_batch() {
    let (_kv, records) = common::memory_records();
    let transfer = ScriptedTransfer::new();
    let scheduler = scheduler(&records, &transfer, 400);
    let feed = LocatorListFeed::from_text(format!(
        "# exported\n{}\n\n{}\n",
        common::clip_locator("one.mp4"),
        common::clip_locator("two.mp4")
    ));

    let summary = scheduler.run_feed(&feed, None).await;
    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(transfer.submitted_names(), vec!["one.mp4", "two.mp4"]);
}
