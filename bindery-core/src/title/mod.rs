//! Title inference from page content

mod html;
mod markdown;

pub use html::{ExtractedHtml, HtmlTitleExtractor};
pub use markdown::{ExtractedMarkdown, MarkdownTitleExtractor};
