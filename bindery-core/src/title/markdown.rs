//! Leading H1 extraction for Markdown

use regex::Regex;
use std::sync::OnceLock;

/// Title and remaining body of a Markdown document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMarkdown {
    pub title: Option<String>,
    pub markdown: String,
}

/// Strips a leading `# Title` line from Markdown
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownTitleExtractor;

fn line_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r\n|\n|\r").expect("valid line break pattern"))
}

fn h1_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#\s+(.+)$").expect("valid heading pattern"))
}

fn closing_hashes() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+#*$").expect("valid closing sequence pattern"))
}

impl MarkdownTitleExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Take the title from the first non-blank line if it is an H1.
    ///
    /// Only the first non-blank line is ever considered. Without a title the
    /// input comes back untouched.
    pub fn extract(&self, markdown: &str) -> ExtractedMarkdown {
        let lines: Vec<&str> = line_break().split(markdown).collect();

        let Some((index, first)) = lines
            .iter()
            .enumerate()
            .find(|(_, line)| !line.trim().is_empty())
        else {
            return Self::untitled(markdown);
        };

        let candidate = first.trim().trim_start_matches('\u{feff}');
        let Some(captures) = h1_heading().captures(candidate) else {
            return Self::untitled(markdown);
        };

        let raw = captures[1].trim();
        let title = closing_hashes().replace(raw, "").trim().to_string();

        let body = lines[index + 1..].join("\n");
        let body = body.trim_start_matches(['\r', '\n']).to_string();

        ExtractedMarkdown {
            title: (!title.is_empty()).then_some(title),
            markdown: body,
        }
    }

    fn untitled(markdown: &str) -> ExtractedMarkdown {
        ExtractedMarkdown {
            title: None,
            markdown: markdown.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extracts_first_heading_as_title() {
        let result = MarkdownTitleExtractor::new().extract("# My Title\n\nBody text\n");

        assert_eq!(result.title.as_deref(), Some("My Title"));
        assert_eq!(result.markdown, "Body text\n");
    }

    #[test]
    fn test_handles_missing_heading() {
        let markdown = "Intro line\n# Later Title\n";
        let result = MarkdownTitleExtractor::new().extract(markdown);

        assert_eq!(result.title, None);
        assert_eq!(result.markdown, markdown);
    }

    #[test]
    fn test_strips_trailing_hashes_from_title() {
        let result = MarkdownTitleExtractor::new().extract("# Title Here #\nContent");

        assert_eq!(result.title.as_deref(), Some("Title Here"));
        assert_eq!(result.markdown, "Content");
    }

    #[test]
    fn test_skips_blank_lines_and_bom() {
        let result = MarkdownTitleExtractor::new().extract("\n  \n\u{feff}# Setup ##  \r\n\r\nStep one");

        assert_eq!(result.title.as_deref(), Some("Setup"));
        assert_eq!(result.markdown, "Step one");
    }

    #[test]
    fn test_deeper_headings_are_not_titles() {
        let markdown = "## Section\n\ntext";
        let result = MarkdownTitleExtractor::new().extract(markdown);

        assert_eq!(result.title, None);
        assert_eq!(result.markdown, markdown);
    }

    #[test]
    fn test_hash_without_space_is_not_a_heading() {
        let markdown = "#hashtag\nmore";
        assert_eq!(MarkdownTitleExtractor::new().extract(markdown).title, None);
    }

    #[test]
    fn test_empty_input() {
        let result = MarkdownTitleExtractor::new().extract("");
        assert_eq!(result.title, None);
        assert_eq!(result.markdown, "");
    }

    proptest! {
        #[test]
        fn prop_only_the_heading_line_is_removed(
            title in "[A-Za-z][A-Za-z0-9 ]{0,20}[A-Za-z0-9]",
            hashes in "#{0,3}",
            pad in " {0,3}",
            body in "[a-z]{1,10}(\n[a-z ]{0,10}){0,4}",
        ) {
            let closing = if hashes.is_empty() { String::new() } else { format!(" {}", hashes) };
            let markdown = format!("{}# {}{}{}\n{}", pad, title, closing, pad, body);

            let result = MarkdownTitleExtractor::new().extract(&markdown);

            prop_assert_eq!(result.title.as_deref(), Some(title.trim()));
            prop_assert_eq!(result.markdown, body);
        }
    }
}
