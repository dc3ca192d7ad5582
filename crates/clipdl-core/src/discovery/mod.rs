//! Discovery feeds: sources of candidate locators.
//!
//! The orchestrator never discovers anything itself; it asks a feed for the
//! current candidate list when a batch is triggered.

mod html;
mod list;

pub use html::{HtmlDocumentFeed, MP4_SOURCE_SELECTOR};
pub use list::LocatorListFeed;

/// A discovered, not-yet-evaluated item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub locator: String,
    /// Where the candidate came from (line number, page link, ...); only used
    /// for feedback.
    pub handle: Option<String>,
}

impl Candidate {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            handle: None,
        }
    }

    pub fn with_handle(locator: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            handle: Some(handle.into()),
        }
    }
}

/// Supplies the current candidate list on demand.
pub trait DiscoveryFeed: Send + Sync {
    fn list_candidates(&self) -> Vec<Candidate>;
}

impl DiscoveryFeed for Vec<Candidate> {
    fn list_candidates(&self) -> Vec<Candidate> {
        self.clone()
    }
}
