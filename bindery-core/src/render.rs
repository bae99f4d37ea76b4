//! Markdown to HTML rendering

use crate::error::ContentError;
use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::OnceLock;

/// Converts Markdown into (unsanitized) HTML
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, ContentError>;
}

/// CommonMark renderer with tables, strikethrough and bare-URL autolinking.
///
/// Raw HTML is passed through; callers are expected to sanitize the output.
#[derive(Debug, Clone)]
pub struct CommonMarkRenderer {
    tables: bool,
    strikethrough: bool,
    autolink: bool,
}

impl Default for CommonMarkRenderer {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
        }
    }
}

impl CommonMarkRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.tables = enabled;
        self
    }

    pub fn with_strikethrough(mut self, enabled: bool) -> Self {
        self.strikethrough = enabled;
        self
    }

    /// Turn bare `http(s)://` and `www.` URLs in text into links
    pub fn with_autolink(mut self, enabled: bool) -> Self {
        self.autolink = enabled;
        self
    }

    fn options(&self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        options
    }
}

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> Result<String, ContentError> {
        let parser = Parser::new_ext(markdown, self.options());

        let mut events: Vec<Event> = Vec::new();
        let mut code_depth = 0usize;
        let mut link_depth = 0usize;
        let mut raw_anchor_depth = 0isize;

        for event in merge_text(parser) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_depth += 1;
                    events.push(Event::Start(Tag::CodeBlock(kind)));
                }
                Event::End(TagEnd::CodeBlock) => {
                    code_depth = code_depth.saturating_sub(1);
                    events.push(Event::End(TagEnd::CodeBlock));
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    link_depth += 1;
                    events.push(Event::Start(Tag::Link {
                        link_type,
                        dest_url: safe_destination(dest_url, false),
                        title,
                        id,
                    }));
                }
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    link_depth += 1;
                    events.push(Event::Start(Tag::Image {
                        link_type,
                        dest_url: safe_destination(dest_url, true),
                        title,
                        id,
                    }));
                }
                Event::End(end @ (TagEnd::Link | TagEnd::Image)) => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(Event::End(end));
                }
                event @ (Event::Html(_) | Event::InlineHtml(_)) => {
                    if let Event::Html(html) | Event::InlineHtml(html) = &event {
                        raw_anchor_depth = (raw_anchor_depth + anchor_balance(html)).max(0);
                    }
                    events.push(event);
                }
                Event::Text(text)
                    if self.autolink
                        && code_depth == 0
                        && link_depth == 0
                        && raw_anchor_depth == 0 =>
                {
                    autolink(text, &mut events);
                }
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        Ok(out)
    }
}

/// Coalesce adjacent text events so URLs are not split across them
fn merge_text<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut merged: Vec<Event<'a>> = Vec::new();
    for event in events {
        if let Event::Text(text) = &event {
            if let Some(Event::Text(previous)) = merged.last_mut() {
                let mut joined = String::from(&**previous);
                joined.push_str(text);
                *previous = CowStr::from(joined);
                continue;
            }
        }
        merged.push(event);
    }
    merged
}

fn bare_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"]*[^\s<>"'.,:;!?)\]]"#)
            .expect("valid autolink pattern")
    })
}

fn raw_anchor() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(/?)a(?:\s[^>]*)?>").expect("valid anchor pattern"))
}

/// Net number of `<a>` elements opened by a raw HTML snippet
fn anchor_balance(html: &str) -> isize {
    raw_anchor()
        .captures_iter(html)
        .map(|c| if c[1].is_empty() { 1 } else { -1 })
        .sum()
}

fn autolink<'a>(text: CowStr<'a>, events: &mut Vec<Event<'a>>) {
    let mut last = 0;
    for found in bare_url().find_iter(&text) {
        if found.start() > last {
            events.push(Event::Text(CowStr::from(text[last..found.start()].to_string())));
        }

        let url = found.as_str();
        let href = if url.to_ascii_lowercase().starts_with("www.") {
            format!("http://{}", url)
        } else {
            url.to_string()
        };

        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(href),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        events.push(Event::Text(CowStr::from(url.to_string())));
        events.push(Event::End(TagEnd::Link));
        last = found.end();
    }

    if last == 0 {
        events.push(Event::Text(text));
    } else if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Blank out script-capable destinations; images may keep raster data URIs
fn safe_destination(dest: CowStr<'_>, image: bool) -> CowStr<'_> {
    let compact: String = dest
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let unsafe_scheme = ["javascript:", "vbscript:", "file:"]
        .iter()
        .any(|scheme| compact.starts_with(scheme));
    let unsafe_data = compact.starts_with("data:")
        && !(image
            && ["data:image/png", "data:image/gif", "data:image/jpeg", "data:image/webp"]
                .iter()
                .any(|prefix| compact.starts_with(prefix)));

    if unsafe_scheme || unsafe_data {
        CowStr::Borrowed("")
    } else {
        dest
    }
}
