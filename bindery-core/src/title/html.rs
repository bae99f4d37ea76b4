//! First-H1 extraction for HTML

use crate::html::parse_fragment;
use scraper::{ElementRef, Node};

/// Title and remaining markup of an HTML fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedHtml {
    pub title: Option<String>,
    pub html: String,
}

/// Removes the first `<h1>` from a fragment and returns its text as the title
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTitleExtractor;

impl HtmlTitleExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the first `<h1>` anywhere in the fragment.
    ///
    /// The heading is removed even when its text is blank; in that case no
    /// title is reported. Blank input is returned as is.
    pub fn extract(&self, html: &str) -> ExtractedHtml {
        if html.trim().is_empty() {
            return ExtractedHtml {
                title: None,
                html: html.to_string(),
            };
        }

        let mut fragment = parse_fragment(html);

        let heading = fragment
            .root_element()
            .descendants()
            .find(|node| matches!(node.value(), Node::Element(el) if el.name() == "h1"))
            .and_then(ElementRef::wrap)
            .map(|h1| (h1.id(), h1.text().collect::<String>()));

        let Some((id, text)) = heading else {
            return ExtractedHtml {
                title: None,
                html: html.to_string(),
            };
        };

        if let Some(mut node) = fragment.tree.get_mut(id) {
            node.detach();
        }

        let title = text.trim().to_string();
        ExtractedHtml {
            title: (!title.is_empty()).then_some(title),
            html: fragment.root_element().inner_html(),
        }
    }
}
