//! Transfer facility: moves the bytes for one request.
//!
//! The orchestrator treats a transfer as fire-and-forget with a single
//! outcome. Nothing here retries; callers see timeouts and errors as distinct
//! outcomes and decide what to do.

mod classify;
mod http;
mod storage;

pub use http::CurlTransfer;
pub use classify::{classify_curl_error, classify_http_status};
pub use storage::{temp_path, TEMP_SUFFIX};

use async_trait::async_trait;

/// One transfer request: where to fetch from and what to name the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: String,
    pub destination_name: String,
}

/// Why a transfer did not complete.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("HTTP {0}")]
    Http(u32),
    #[error("connection: {0}")]
    Connection(String),
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

impl TransferError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransferError::Timeout(_))
    }
}

#[async_trait]
pub trait Transfer: Send + Sync {
    /// Performs the transfer; resolves once it completed, timed out, or failed.
    async fn fetch(&self, request: &TransferRequest) -> Result<(), TransferError>;
}
