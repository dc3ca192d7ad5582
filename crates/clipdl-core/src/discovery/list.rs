use super::{Candidate, DiscoveryFeed};

/// Newline-separated locators. Blank lines and `#` comments are ignored;
/// each candidate's handle is `line N` (1-based).
#[derive(Debug, Clone, Default)]
pub struct LocatorListFeed {
    text: String,
}

impl LocatorListFeed {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl DiscoveryFeed for LocatorListFeed {
    fn list_candidates(&self) -> Vec<Candidate> {
        self.text
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                Some(Candidate::with_handle(line, format!("line {}", i + 1)))
            })
            .collect()
    }
}
