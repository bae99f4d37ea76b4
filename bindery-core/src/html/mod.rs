//! HTML parsing helpers and sanitization

mod sanitizer;

pub use sanitizer::HtmlSanitizer;

use scraper::{Html, Selector};

/// Parse HTML into a fragment tree.
///
/// Full documents are reduced to the contents of their `<body>` first, so
/// `<head>` material never reaches the fragment.
pub fn parse_fragment(html: &str) -> Html {
    if !looks_like_document(html) {
        return Html::parse_fragment(html);
    }

    let document = Html::parse_document(html);
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next().map(|b| b.inner_html()))
        .unwrap_or_default();
    Html::parse_fragment(&body)
}

fn looks_like_document(html: &str) -> bool {
    let head = html.trim_start().to_ascii_lowercase();
    head.starts_with("<!doctype") || head.contains("<html") || head.contains("<body")
}

/// Escape text content for serialization
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for a double-quoted context
pub(crate) fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}
