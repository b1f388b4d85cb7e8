//! Text and attribute cleanup shared by the record parsers and the renderer.

use scraper::{ElementRef, Node};

/// Elements whose boundaries separate words in rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th",
    "tr", "ul",
];

/// Collapse every run of whitespace to a single space and trim the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Flattened, whitespace-normalized text of an element, close to what the
/// page renders.
///
/// Inline fragments (mentions, topics, emoji) are concatenated as-is. Block
/// boundaries and video stat items become a space.
#[must_use]
pub fn element_text(element: &ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_rendered_text(element, &mut raw);
    collapse_whitespace(&raw)
}

fn push_rendered_text(element: &ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if matches!(el.name(), "script" | "style") => {}
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let separated = separates_words(&child);
                if separated {
                    out.push(' ');
                }
                push_rendered_text(&child, out);
                if separated {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn separates_words(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    BLOCK_TAGS.contains(&value.name()) || value.classes().any(|c| c.ends_with("__stat-item"))
}

/// Same as [`element_text`], but empty for a missing element.
#[must_use]
pub fn optional_text(element: Option<ElementRef<'_>>) -> String {
    element.map(|el| element_text(&el)).unwrap_or_default()
}

/// Upgrade a protocol-relative URL (`//host/path`) to `https://host/path`.
///
/// Anything else is returned unchanged.
#[must_use]
pub fn absolutize_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

/// Drop the query string (and anything after it) from a URL.
#[must_use]
pub fn strip_query(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => base.to_string(),
        None => url.to_string(),
    }
}

/// Escape a free-text value for use inside a GFM table cell.
///
/// Pipes become the full-width `｜` and newlines become `<br>`.
#[must_use]
pub fn escape_cell(text: &str) -> String {
    text.replace('|', "｜").replace("\r\n", "<br>").replace('\n', "<br>")
}
