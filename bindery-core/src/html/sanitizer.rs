//! Allow-list HTML sanitizer
//!
//! Sanitization runs in three passes over a parsed fragment:
//!
//! 1. **Normalize**: unsafe elements are removed with their content, then
//!    configured renames apply, then any tag outside the allow-list becomes
//!    `span` (known inline tags) or `div`.
//! 2. **Filter**: attributes are reduced to the per-tag allow-list and
//!    URL-bearing attributes are checked against the scheme allow-list.
//! 3. **Serialize**: the cleaned tree is written back out with escaping.
//!
//! Removal happens on the source tag name, before any rename, so a renamed
//! tag can never smuggle unsafe content through.

use super::{escape_attribute, escape_text, parse_fragment};
use ego_tree::NodeRef;
use scraper::Node;
use std::collections::HashMap;

/// Allowed tags with their allowed attributes, in output order
const ALLOWED_TAGS: &[(&str, &[&str])] = &[
    ("p", &[]),
    ("div", &[]),
    ("br", &[]),
    ("hr", &[]),
    ("h1", &[]),
    ("h2", &[]),
    ("h3", &[]),
    ("h4", &[]),
    ("h5", &[]),
    ("h6", &[]),
    ("strong", &[]),
    ("em", &[]),
    ("b", &[]),
    ("i", &[]),
    ("u", &[]),
    ("s", &[]),
    ("del", &[]),
    ("blockquote", &[]),
    ("pre", &[]),
    ("code", &[]),
    ("ul", &[]),
    ("ol", &[]),
    ("li", &[]),
    ("dl", &[]),
    ("dt", &[]),
    ("dd", &[]),
    ("table", &[]),
    ("caption", &[]),
    ("colgroup", &[]),
    ("col", &[]),
    ("thead", &[]),
    ("tbody", &[]),
    ("tfoot", &[]),
    ("tr", &[]),
    ("th", &["colspan", "rowspan"]),
    ("td", &["colspan", "rowspan"]),
    ("section", &[]),
    ("article", &[]),
    ("header", &[]),
    ("footer", &[]),
    ("nav", &[]),
    ("aside", &[]),
    ("main", &[]),
    ("figure", &[]),
    ("figcaption", &[]),
    ("sup", &[]),
    ("sub", &[]),
    ("small", &[]),
    ("mark", &[]),
    ("kbd", &[]),
    ("a", &["href", "title", "rel", "target"]),
    ("img", &["src", "alt", "title"]),
    ("span", &[]),
];

/// Unknown tags that degrade to `span` instead of `div`
const INLINE_FALLBACK_TAGS: &[&str] = &[
    "abbr", "cite", "q", "time", "var", "samp", "bdi", "bdo", "data", "dfn", "ruby", "rt", "rp",
    "wbr",
];

/// Removed together with everything inside them
const DROP_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "link", "meta", "noscript", "template",
    "frame", "frameset", "applet", "base", "title",
];

const VOID_TAGS: &[&str] = &["br", "hr", "img", "col"];

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

const MAX_SPAN: u32 = 1000;

/// Node of the working tree; children are indices into the arena
#[derive(Debug, Clone, PartialEq)]
enum Fragment {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<usize>,
    },
    Text(String),
}

/// Flat working tree, walked with explicit stacks instead of recursion
#[derive(Debug)]
struct Arena {
    nodes: Vec<Fragment>,
}

/// Index of the synthetic fragment root
const ROOT: usize = 0;

impl Arena {
    fn new() -> Self {
        Self {
            nodes: vec![Fragment::Element {
                tag: String::new(),
                attrs: Vec::new(),
                children: Vec::new(),
            }],
        }
    }

    fn push(&mut self, parent: usize, node: Fragment) -> usize {
        let id = self.nodes.len();
        self.nodes.push(node);
        if let Fragment::Element { children, .. } = &mut self.nodes[parent] {
            children.push(id);
        }
        id
    }

    fn children(&self, id: usize) -> &[usize] {
        match &self.nodes[id] {
            Fragment::Element { children, .. } => children,
            Fragment::Text(_) => &[],
        }
    }
}

/// Sanitizes untrusted HTML into the fixed safe subset
#[derive(Debug, Clone, Default)]
pub struct HtmlSanitizer {
    tag_fallbacks: HashMap<String, String>,
}

impl HtmlSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename `from` to `to` during normalization.
    ///
    /// The target still has to pass the allow-list; unsafe source tags are
    /// removed before renames are considered.
    pub fn with_tag_fallback(mut self, from: &str, to: &str) -> Self {
        self.tag_fallbacks
            .insert(from.to_ascii_lowercase(), to.to_ascii_lowercase());
        self
    }

    /// Sanitize an HTML fragment or document.
    ///
    /// Parsing is lenient, so malformed markup is repaired rather than
    /// rejected. Empty input yields an empty string.
    pub fn sanitize(&self, html: &str) -> String {
        if html.trim().is_empty() {
            return String::new();
        }

        let fragment = parse_fragment(html);
        let mut arena = self.normalize(*fragment.root_element());
        filter(&mut arena);

        let mut out = String::with_capacity(html.len());
        serialize(&arena, &mut out);
        out
    }

    fn normalize(&self, root: NodeRef<'_, Node>) -> Arena {
        let mut arena = Arena::new();
        let mut stack: Vec<(NodeRef<'_, Node>, usize)> = Vec::new();
        push_children(&mut stack, root, ROOT);

        while let Some((node, parent)) = stack.pop() {
            match node.value() {
                Node::Text(text) => {
                    arena.push(parent, Fragment::Text(text.to_string()));
                }
                Node::Element(el) => {
                    if let Some(fragment) = self.normalize_element(el) {
                        let id = arena.push(parent, fragment);
                        push_children(&mut stack, node, id);
                    }
                }
                _ => {}
            }
        }

        arena
    }

    /// Normalized element without children, or None to drop its subtree
    fn normalize_element(&self, element: &scraper::node::Element) -> Option<Fragment> {
        let source = element.name().to_ascii_lowercase();
        if DROP_TAGS.contains(&source.as_str()) {
            return None;
        }

        let renamed = self
            .tag_fallbacks
            .get(&source)
            .cloned()
            .unwrap_or(source.clone());

        let (tag, attrs) = if allowed_attributes(&renamed).is_some() {
            let attrs = element
                .attrs()
                .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
                .collect();
            (renamed, attrs)
        } else if INLINE_FALLBACK_TAGS.contains(&source.as_str()) {
            ("span".to_string(), Vec::new())
        } else {
            ("div".to_string(), Vec::new())
        };

        Some(Fragment::Element {
            tag,
            attrs,
            children: Vec::new(),
        })
    }
}

/// Queue children in reverse so they pop in document order
fn push_children<'a>(
    stack: &mut Vec<(NodeRef<'a, Node>, usize)>,
    node: NodeRef<'a, Node>,
    parent: usize,
) {
    let children: Vec<NodeRef<'a, Node>> = node.children().collect();
    stack.extend(children.into_iter().rev().map(|child| (child, parent)));
}

fn allowed_attributes(tag: &str) -> Option<&'static [&'static str]> {
    ALLOWED_TAGS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, attrs)| *attrs)
}

/// Filter attributes in place and unlink rejected elements.
///
/// Children always have higher indices than their parent, so walking the
/// arena backwards settles every child before its parent is visited.
fn filter(arena: &mut Arena) {
    let mut keep = vec![true; arena.nodes.len()];

    for id in (0..arena.nodes.len()).rev() {
        let Fragment::Element {
            tag,
            attrs,
            children,
        } = &mut arena.nodes[id]
        else {
            continue;
        };

        if id != ROOT {
            let filtered = allowed_attributes(tag)
                .and_then(|allowed| filter_attributes(tag, allowed, attrs));
            match filtered {
                Some(filtered) => *attrs = filtered,
                None => {
                    keep[id] = false;
                    children.clear();
                    continue;
                }
            }
            if VOID_TAGS.contains(&tag.as_str()) {
                children.clear();
            }
        }
        children.retain(|child| keep[*child]);
    }
}

/// Keep allowed attributes with valid values, or None to drop the element
fn filter_attributes(
    tag: &str,
    allowed: &[&str],
    attrs: &[(String, String)],
) -> Option<Vec<(String, String)>> {
    let mut kept: Vec<(String, String)> = Vec::new();

    for name in allowed {
        let Some((_, value)) = attrs.iter().find(|(n, _)| n == name) else {
            continue;
        };
        let cleaned = match *name {
            "href" | "src" => is_safe_uri(value).then(|| value.trim().to_string()),
            "target" => value
                .trim()
                .eq_ignore_ascii_case("_blank")
                .then(|| "_blank".to_string()),
            "rel" => Some(rel_tokens(value).join(" ")),
            "colspan" | "rowspan" => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=MAX_SPAN).contains(n))
                .map(|n| n.to_string()),
            _ => Some(value.clone()),
        };
        if let Some(value) = cleaned {
            kept.push((name.to_string(), value));
        }
    }

    match tag {
        "a" => apply_link_rel(&mut kept),
        "img" if !kept.iter().any(|(n, _)| n == "src") => return None,
        _ => {}
    }

    Some(kept)
}

/// Rebuild `rel` for a link: nofollow on external targets, noopener and
/// noreferrer with `target="_blank"`
fn apply_link_rel(attrs: &mut Vec<(String, String)>) {
    let mut tokens = value_of(attrs, "rel").map(|r| rel_tokens(&r)).unwrap_or_default();
    let mut require = |token: &str| {
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    };

    if value_of(attrs, "href").is_some_and(|href| is_external(&href)) {
        require("nofollow");
    }
    if value_of(attrs, "target").is_some() {
        require("noopener");
        require("noreferrer");
    }

    attrs.retain(|(n, _)| n != "rel");
    if !tokens.is_empty() {
        let at = attrs
            .iter()
            .position(|(n, _)| n == "target")
            .unwrap_or(attrs.len());
        attrs.insert(at, ("rel".to_string(), tokens.join(" ")));
    }
}

fn value_of(attrs: &[(String, String)], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.clone())
}

fn rel_tokens(value: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in value.split_whitespace().map(str::to_ascii_lowercase) {
        let valid = token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if valid && !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

fn compact_uri(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect()
}

/// Lowercased scheme of an absolute URI, None for relative references
fn uri_scheme(uri: &str) -> Option<String> {
    let end = uri.find([':', '/', '?', '#'])?;
    if !uri[end..].starts_with(':') {
        return None;
    }

    let scheme = &uri[..end];
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_valid = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    (starts_alpha && rest_valid).then(|| scheme.to_ascii_lowercase())
}

fn is_safe_uri(value: &str) -> bool {
    let uri = compact_uri(value);
    if uri.is_empty() {
        return false;
    }
    match uri_scheme(&uri) {
        Some(scheme) => SAFE_SCHEMES.contains(&scheme.as_str()),
        None => true,
    }
}

fn is_external(href: &str) -> bool {
    let uri = compact_uri(href);
    uri.starts_with("//")
        || uri_scheme(&uri).is_some_and(|s| s == "http" || s == "https")
}

enum Step {
    Open(usize),
    Close(usize),
}

fn serialize(arena: &Arena, out: &mut String) {
    let mut stack: Vec<Step> = arena
        .children(ROOT)
        .iter()
        .rev()
        .map(|id| Step::Open(*id))
        .collect();

    while let Some(step) = stack.pop() {
        match step {
            Step::Open(id) => match &arena.nodes[id] {
                Fragment::Text(text) => out.push_str(&escape_text(text)),
                Fragment::Element {
                    tag,
                    attrs,
                    children,
                } => {
                    out.push('<');
                    out.push_str(tag);
                    for (name, value) in attrs {
                        out.push(' ');
                        out.push_str(name);
                        out.push_str("=\"");
                        out.push_str(&escape_attribute(value));
                        out.push('"');
                    }
                    out.push('>');

                    if VOID_TAGS.contains(&tag.as_str()) {
                        continue;
                    }
                    stack.push(Step::Close(id));
                    stack.extend(children.iter().rev().map(|child| Step::Open(*child)));
                }
            },
            Step::Close(id) => {
                if let Fragment::Element { tag, .. } = &arena.nodes[id] {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn clean(html: &str) -> String {
        HtmlSanitizer::new().sanitize(html)
    }

    #[test]
    fn test_removes_script_with_content() {
        insta::assert_snapshot!(
            clean("<p>Hello <strong>world</strong></p><script>alert(1)</script>"),
            @"<p>Hello <strong>world</strong></p>"
        );
    }

    #[test]
    fn test_removes_embedded_content() {
        assert_eq!(clean("<iframe src=\"x\"></iframe><p>ok</p>"), "<p>ok</p>");
        assert_eq!(clean("<style>p { color: red }</style><p>x</p>"), "<p>x</p>");
        assert_eq!(clean("<p>a<!-- hidden --></p>"), "<p>a</p>");
    }

    #[test]
    fn test_strips_disallowed_attributes() {
        assert_eq!(
            clean("<p id=\"x\" class=\"lead\" style=\"color:red\" onclick=\"go()\">Hi</p>"),
            "<p>Hi</p>"
        );
    }

    #[test]
    fn test_unsafe_link_schemes() {
        assert_eq!(
            clean("<a href=\"javascript:alert(1)\" onclick=\"x()\">click</a>"),
            "<a>click</a>"
        );
        assert_eq!(clean("<a href=\"data:text/html,x\">d</a>"), "<a>d</a>");
        assert_eq!(
            clean("<a href=\" JaVa&#x09;Script:alert(1)\">x</a>"),
            "<a>x</a>"
        );
    }

    #[test]
    fn test_external_link_rel() {
        insta::assert_snapshot!(
            clean("<a href=\"https://example.com\" target=\"_blank\" class=\"btn\">Go</a>"),
            @r#"<a href="https://example.com" rel="nofollow noopener noreferrer" target="_blank">Go</a>"#
        );
    }

    #[test]
    fn test_relative_and_mailto_links() {
        assert_eq!(
            clean("<a href=\"/docs/setup\">Setup</a>"),
            "<a href=\"/docs/setup\">Setup</a>"
        );
        assert_eq!(
            clean("<a href=\"mailto:ops@example.com\" target=\"_self\">Mail</a>"),
            "<a href=\"mailto:ops@example.com\">Mail</a>"
        );
    }

    #[test]
    fn test_images() {
        assert_eq!(clean("<img src=\"javascript:alert(1)\">"), "");
        assert_eq!(clean("<p>a<img alt=\"none\">b</p>"), "<p>ab</p>");
        assert_eq!(
            clean("<img src=\"diagram.png\" alt=\"Diagram\" onerror=\"x()\">"),
            "<img src=\"diagram.png\" alt=\"Diagram\">"
        );
    }

    #[test]
    fn test_table_spans() {
        assert_eq!(
            clean("<table><tr><td colspan=\"2\" rowspan=\"0\">A</td></tr></table>"),
            "<table><tbody><tr><td colspan=\"2\">A</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_unknown_tags_fall_back() {
        assert_eq!(clean("<abbr title=\"x\">HTML</abbr>"), "<span>HTML</span>");
        assert_eq!(clean("<center>Hi</center>"), "<div>Hi</div>");
        assert_eq!(
            clean("<custom-widget><p>x</p></custom-widget>"),
            "<div><p>x</p></div>"
        );
    }

    #[test]
    fn test_configured_fallbacks() {
        let sanitizer = HtmlSanitizer::new()
            .with_tag_fallback("center", "p")
            .with_tag_fallback("script", "p");

        assert_eq!(sanitizer.sanitize("<center>x</center>"), "<p>x</p>");
        assert_eq!(sanitizer.sanitize("<script>alert(1)</script>"), "");
    }

    #[test]
    fn test_escapes_text() {
        assert_eq!(
            clean("<p>a &lt; b &amp; c</p>"),
            "<p>a &lt; b &amp; c</p>"
        );
    }

    #[test]
    fn test_full_document() {
        assert_eq!(
            clean("<html><head><title>T</title></head><body><h1>Doc</h1><p>Body</p></body></html>"),
            "<h1>Doc</h1><p>Body</p>"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("   \n"), "");
    }

    #[test]
    fn test_deeply_nested_input() {
        let depth = 50_000;
        let html = format!("{}x{}", "<span>".repeat(depth), "</span>".repeat(depth));

        let out = clean(&html);
        assert!(out.starts_with("<span><span>"));
        assert!(out.ends_with("</span></span>"));
        assert_eq!(out.matches("<span>").count(), depth);
        assert_eq!(out.matches("</span>").count(), depth);
    }

    #[test]
    fn test_nested_removal_keeps_siblings() {
        assert_eq!(
            clean("<div><p>a<img alt=\"x\"><em>b<script>c</script></em></p><p>d</p></div>"),
            "<div><p>a<em>b</em></p><p>d</p></div>"
        );
    }

    #[test]
    fn test_uri_scheme() {
        assert_eq!(uri_scheme("HTTPS://x"), Some("https".to_string()));
        assert_eq!(uri_scheme("/a:b"), None);
        assert_eq!(uri_scheme("page.html"), None);
        assert_eq!(uri_scheme("1abc:x"), None);
    }

    proptest! {
        #[test]
        fn prop_script_elements_never_survive(text in "\\PC{0,80}", payload in "[a-z]{1,12}") {
            let input = format!("<p>{}</p><script>{}</script><SCRIPT>{}</SCRIPT>", text, payload, payload);
            let out = clean(&input);
            prop_assert!(!out.to_ascii_lowercase().contains("<script"));
        }

        #[test]
        fn prop_only_safe_schemes_in_links(
            scheme in prop::sample::select(vec!["javascript", "vbscript", "data", "file", "http", "https", "mailto"]),
            rest in "[a-z0-9/.]{1,20}",
        ) {
            let out = clean(&format!("<a href=\"{}:{}\">x</a>", scheme, rest));
            let kept = out.contains("href=");
            prop_assert_eq!(kept, SAFE_SCHEMES.contains(&scheme));
        }
    }
}
