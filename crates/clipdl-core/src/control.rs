//! Batch control: shared abort tokens for running batches.
//!
//! When the scheduler runs with a `BatchControl`, each running batch is
//! registered with an abort token. A caller (e.g. the CLI's Ctrl-C handler)
//! can request abort for one batch or all of them; the dispatcher checks the
//! token before each submission and stops handing out new items.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Shared registry of batch id -> abort token.
#[derive(Debug, Default)]
pub struct BatchControl {
    batches: RwLock<HashMap<u64, Arc<AtomicBool>>>,
}

impl BatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running batch; returns the abort token its dispatcher polls.
    pub fn register(&self, batch_id: u64) -> Arc<AtomicBool> {
        let token = Arc::new(AtomicBool::new(false));
        self.batches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(batch_id, Arc::clone(&token));
        token
    }

    /// Unregister a batch (call when it finalizes).
    pub fn unregister(&self, batch_id: u64) {
        self.batches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&batch_id);
    }

    /// Request abort for one batch. Returns false if no such batch is running.
    pub fn request_abort(&self, batch_id: u64) -> bool {
        match self
            .batches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&batch_id)
        {
            Some(token) => {
                token.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Request abort for every registered batch. Returns how many were signalled.
    pub fn abort_all(&self) -> usize {
        let batches = self.batches.read().unwrap_or_else(PoisonError::into_inner);
        for token in batches.values() {
            token.store(true, Ordering::Relaxed);
        }
        batches.len()
    }

    /// Ids of the batches currently registered.
    pub fn running(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .batches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }
}
