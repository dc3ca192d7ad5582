#![allow(dead_code)]

pub mod clip_server;
pub mod scripted;

use std::sync::Arc;

use clipdl_core::kv::MemoryKv;
use clipdl_core::records::{RecordStore, DEFAULT_RECORDS_KEY};

/// Record store over a fresh in-memory backend.
pub fn memory_records() -> (Arc<MemoryKv>, RecordStore) {
    let kv = Arc::new(MemoryKv::new());
    let store = RecordStore::new(kv.clone(), DEFAULT_RECORDS_KEY);
    (kv, store)
}

/// Locator on the test CDN whose final segment is `name`.
pub fn clip_locator(name: &str) -> String {
    format!("https://cdn.example.com/xG1n/transcode=true,width=450/{}", name)
}
