//! Candidates from a saved HTML page: every `<video>` MP4 `<source>`.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{Candidate, DiscoveryFeed};

/// Selector for the MP4 sources of embedded videos.
pub const MP4_SOURCE_SELECTOR: &str = r#"video source[type="video/mp4"]"#;

/// Parses an HTML document and yields the `src` of every MP4 video source.
///
/// Relative sources are resolved against `base` when one is given and kept
/// as-is otherwise. The handle is the `href` of the enclosing link, if any.
#[derive(Debug, Clone)]
pub struct HtmlDocumentFeed {
    document: String,
    base: Option<Url>,
}

impl HtmlDocumentFeed {
    pub fn new(document: impl Into<String>, base: Option<Url>) -> Self {
        Self {
            document: document.into(),
            base,
        }
    }

    fn resolve(&self, src: &str) -> String {
        match &self.base {
            Some(base) => base
                .join(src)
                .map(String::from)
                .unwrap_or_else(|_| src.to_string()),
            None => src.to_string(),
        }
    }
}

impl DiscoveryFeed for HtmlDocumentFeed {
    fn list_candidates(&self) -> Vec<Candidate> {
        let html = Html::parse_document(&self.document);
        let Ok(selector) = Selector::parse(MP4_SOURCE_SELECTOR) else {
            return Vec::new();
        };

        html.select(&selector)
            .filter_map(|source| {
                let src = source.value().attr("src")?.trim();
                if src.is_empty() {
                    return None;
                }
                Some(Candidate {
                    locator: self.resolve(src),
                    handle: enclosing_link(source),
                })
            })
            .collect()
    }
}

fn enclosing_link(element: ElementRef<'_>) -> Option<String> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "a")
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}
