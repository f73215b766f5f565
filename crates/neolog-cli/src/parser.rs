//! Document parser for TEI-flavoured corpus files.
//!
//! The corpus format puts the publication date in a `<date>` element, the
//! byline in `<author>`, the outlet in `<publisher>`, the original URL in
//! `<ptr type="URL" target="...">`, headings in `<fw>` elements and the
//! article body inside `<text>`. Extraction is tolerant: a missing metadata
//! element yields `None` and lets the ingestion layer decide; only a missing
//! body or broken encoding fails the document.

use neolog_types::{DocumentParser, ParseError, RawDocument};
use regex::Regex;

/// TEI-flavoured implementation of the engine's parser interface.
pub struct TeiParser {
    url_ptr: Regex,
}

impl TeiParser {
    pub fn new() -> Self {
        Self {
            url_ptr: Regex::new(r#"<ptr\b[^>]*type="URL"[^>]*target="([^"]*)""#)
                .expect("url pointer pattern compiles"),
        }
    }
}

impl Default for TeiParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for TeiParser {
    fn parse(&self, bytes: &[u8]) -> Result<RawDocument, ParseError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ParseError::Encoding)?;
        let body = element_inner(text, "text").ok_or(ParseError::MissingElement("text"))?;

        Ok(RawDocument {
            date: element_inner(text, "date").map(flatten),
            author: element_inner(text, "author").map(flatten),
            url: self
                .url_ptr
                .captures(text)
                .map(|captures| captures[1].to_string()),
            publisher: element_inner(text, "publisher").map(flatten),
            heading_texts: elements_inner(text, "fw").into_iter().map(flatten).collect(),
            body_text: flatten(body),
        })
    }
}

/// Inner text of the first `<tag>`/`<tag attr=...>` element, skipping
/// self-closing occurrences. `None` when the element is absent or unclosed.
fn element_inner<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    next_element(text, tag, 0).map(|(inner, _)| inner)
}

/// Inner texts of every occurrence of the element.
fn elements_inner<'a>(text: &'a str, tag: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some((inner, next)) = next_element(text, tag, from) {
        found.push(inner);
        from = next;
    }
    found
}

fn next_element<'a>(text: &'a str, tag: &str, from: usize) -> Option<(&'a str, usize)> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut search = from;
    while let Some(offset) = text[search..].find(&open) {
        let after_name = search + offset + open.len();
        let rest = &text[after_name..];
        let content_start = if rest.starts_with('>') {
            after_name + 1
        } else if rest.chars().next().is_some_and(char::is_whitespace) {
            let gt = rest.find('>')?;
            if rest[..gt].ends_with('/') {
                // Self-closing, no content.
                search = after_name + gt + 1;
                continue;
            }
            after_name + gt + 1
        } else {
            // A longer tag name sharing the prefix, e.g. <dateline>.
            search = after_name;
            continue;
        };
        let end = text[content_start..].find(&close)?;
        let inner = &text[content_start..content_start + end];
        return Some((inner, content_start + end + close.len()));
    }
    None
}

/// Drop nested markup, decode the basic entities and collapse whitespace.
fn flatten(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut in_tag = false;
    for ch in inner.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if in_tag => {}
            _ => out.push(ch),
        }
    }
    let decoded = out
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
