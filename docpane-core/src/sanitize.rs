//! Allow-list HTML sanitizing for generated markup
//!
//! Every HTML-bearing string produced by the crate (search highlights and
//! rendered sections) passes through an [`HtmlSanitizer`] before it is handed
//! to a rendering surface. Disallowed tags are escaped into text, disallowed
//! attributes and unsafe URLs are dropped, and comments are removed.

use std::collections::BTreeSet;

use crate::security::{EventSource, SecurityEvent};

const DEFAULT_TAGS: &[&str] = &[
    "a", "blockquote", "br", "button", "code", "del", "div", "em", "h1", "h2", "h3", "h4", "h5",
    "h6", "hr", "img", "input", "li", "mark", "ol", "p", "pre", "span", "strong", "sup", "table",
    "tbody", "td", "th", "thead", "tr", "ul",
];

const DEFAULT_ATTRIBUTES: &[&str] = &[
    "alt", "checked", "class", "data-copy", "disabled", "href", "id", "src", "title", "type",
];

const URL_ATTRIBUTES: &[&str] = &["href", "src"];
const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Sanitized markup plus a record of everything that was removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sanitized {
    pub html: String,
    pub events: Vec<SecurityEvent>,
}

/// Turns untrusted markup into markup safe to insert into a page
pub trait HtmlSanitizer {
    fn sanitize(&self, html: &str) -> Sanitized;
}

/// Sanitizer keeping only allow-listed tags and attributes
#[derive(Debug, Clone)]
pub struct AllowListSanitizer {
    tags: BTreeSet<String>,
    attributes: BTreeSet<String>,
}

impl Default for AllowListSanitizer {
    fn default() -> Self {
        Self {
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            attributes: DEFAULT_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl AllowListSanitizer {
    /// Sanitizer with explicit allow-lists (names are matched lowercase)
    pub fn new<T, A>(tags: T, attributes: A) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(|t| t.into().to_ascii_lowercase()).collect(),
            attributes: attributes
                .into_iter()
                .map(|a| a.into().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn allows_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }

    fn write_tag(&self, tag: &str, out: &mut String, events: &mut Vec<SecurityEvent>) {
        let inner = &tag[1..tag.len() - 1];
        let (closing, inner) = match inner.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, inner),
        };
        let name_len = inner
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(inner.len());
        let name = inner[..name_len].to_ascii_lowercase();

        if !self.allows_tag(&name) {
            events.push(SecurityEvent::warning(
                format!("Escaped disallowed tag <{name}>"),
                EventSource::Sanitizer,
            ));
            out.push_str(&html_escape::encode_text(tag));
            return;
        }

        if closing {
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
            return;
        }

        out.push('<');
        out.push_str(&name);
        let attrs = &inner[name_len..];
        for (attr, value) in parse_attributes(attrs) {
            if !self.attributes.contains(&attr) {
                events.push(SecurityEvent::warning(
                    format!("Dropped attribute `{attr}` on <{name}>"),
                    EventSource::Sanitizer,
                ));
                continue;
            }

            let value = value.map(|v| html_escape::decode_html_entities(v).into_owned());
            let is_url = URL_ATTRIBUTES.contains(&attr.as_str());
            if is_url && value.as_deref().is_some_and(is_unsafe_url) {
                events.push(SecurityEvent::warning(
                    format!("Dropped unsafe URL in `{attr}` on <{name}>"),
                    EventSource::Sanitizer,
                ));
                continue;
            }

            out.push(' ');
            out.push_str(&attr);
            out.push_str("=\"");
            if let Some(value) = value {
                out.push_str(&html_escape::encode_double_quoted_attribute(&value));
            }
            out.push('"');
        }
        if attrs.trim_end().ends_with('/') {
            out.push_str(" /");
        }
        out.push('>');
    }
}

impl HtmlSanitizer for AllowListSanitizer {
    fn sanitize(&self, html: &str) -> Sanitized {
        let mut out = String::with_capacity(html.len());
        let mut events = Vec::new();
        let mut cursor = 0;

        while let Some(offset) = html[cursor..].find('<') {
            let start = cursor + offset;
            out.push_str(&html[cursor..start]);

            if html[start..].starts_with("<!--") {
                cursor = html[start..]
                    .find("-->")
                    .map_or(html.len(), |end| start + end + 3);
                events.push(SecurityEvent::info("Removed HTML comment", EventSource::Sanitizer));
                continue;
            }

            let starts_tag = html[start + 1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '/');
            match tag_end(html, start).filter(|_| starts_tag) {
                Some(end) => {
                    self.write_tag(&html[start..=end], &mut out, &mut events);
                    cursor = end + 1;
                }
                None => {
                    out.push_str("&lt;");
                    cursor = start + 1;
                }
            }
        }
        out.push_str(&html[cursor..]);

        Sanitized { html: out, events }
    }
}

/// Index of the `>` closing the tag opened at `start`, ignoring quoted `>`
fn tag_end(html: &str, start: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (offset, c) in html[start + 1..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '<') => return None,
            (None, '>') => return Some(start + 1 + offset),
            (None, _) => {}
        }
    }
    None
}

/// Parse `name="value"` pairs; names are lowercased
fn parse_attributes(mut input: &str) -> Vec<(String, Option<&str>)> {
    let mut attrs = Vec::new();

    loop {
        input = input.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if input.is_empty() {
            break;
        }

        let name_len = input
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(input.len());
        let name = input[..name_len].to_ascii_lowercase();
        input = input[name_len..].trim_start();

        let mut value = None;
        if let Some(rest) = input.strip_prefix('=') {
            let rest = rest.trim_start();
            match rest.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &rest[1..];
                    let close = body.find(q).unwrap_or(body.len());
                    value = Some(&body[..close]);
                    input = body.get(close + 1..).unwrap_or("");
                }
                _ => {
                    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                    value = Some(&rest[..end]);
                    input = &rest[end..];
                }
            }
        }

        if !name.is_empty() {
            attrs.push((name, value));
        }
    }

    attrs
}

fn is_unsafe_url(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    UNSAFE_SCHEMES.iter().any(|scheme| normalized.starts_with(scheme))
}
