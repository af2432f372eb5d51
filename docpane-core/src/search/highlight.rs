//! Case-insensitive matching and `<mark>` highlighting of snippets

use std::ops::Range;

use crate::sanitize::HtmlSanitizer;

/// Byte ranges of every non-overlapping case-insensitive occurrence of
/// `needle` in `haystack`
pub fn match_ranges(haystack: &str, needle: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    if needle.is_empty() {
        return ranges;
    }

    let mut skip_until = 0;
    for (start, _) in haystack.char_indices() {
        if start < skip_until {
            continue;
        }
        if let Some(end) = match_at(haystack, start, needle) {
            ranges.push(start..end);
            skip_until = end;
        }
    }

    ranges
}

/// Whether `needle` occurs in `haystack`, ignoring case
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack
        .char_indices()
        .any(|(start, _)| match_at(haystack, start, needle).is_some())
}

fn match_at(haystack: &str, start: usize, needle: &str) -> Option<usize> {
    let mut rest = haystack[start..].char_indices();
    let mut end = start;

    for expected in needle.chars() {
        let (offset, actual) = rest.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        end = start + offset + actual.len_utf8();
    }

    Some(end)
}

/// Escape `text` and wrap each occurrence of `query` in `<mark>`
pub fn highlight(text: &str, query: &str) -> String {
    let mut html = String::with_capacity(text.len() + 16);
    let mut cursor = 0;

    for range in match_ranges(text, query) {
        html.push_str(&html_escape::encode_text(&text[cursor..range.start]));
        html.push_str("<mark>");
        html.push_str(&html_escape::encode_text(&text[range.clone()]));
        html.push_str("</mark>");
        cursor = range.end;
    }
    html.push_str(&html_escape::encode_text(&text[cursor..]));

    html
}

/// Highlight and route the markup through `sanitizer`
pub fn highlight_sanitized(text: &str, query: &str, sanitizer: &dyn HtmlSanitizer) -> String {
    sanitizer.sanitize(&highlight(text, query)).html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::AllowListSanitizer;

    #[test]
    fn test_match_ranges_ignore_case() {
        assert_eq!(match_ranges("Next, NEXT and next", "next"), vec![0..4, 6..10, 15..19]);
        assert!(match_ranges("nothing here", "next").is_empty());
        assert!(match_ranges("text", "").is_empty());
    }

    #[test]
    fn test_non_ascii() {
        assert_eq!(match_ranges("Ünïcode ünïcode", "ÜNÏ"), vec![0..5, 10..15]);
        assert!(contains_ignore_case("Grüße", "GRÜ"));
    }

    #[test]
    fn test_highlight_marks_matches() {
        assert_eq!(highlight("What's Next?", "next"), "What's <mark>Next</mark>?");
    }

    #[test]
    fn test_highlight_escapes_text() {
        assert_eq!(
            highlight("<script>next</script>", "next"),
            "&lt;script&gt;<mark>next</mark>&lt;/script&gt;"
        );
    }

    #[test]
    fn test_sanitized_keeps_marks() {
        let sanitizer = AllowListSanitizer::default();
        assert_eq!(
            highlight_sanitized("a < next", "NEXT", &sanitizer),
            "a &lt; <mark>next</mark>"
        );
    }
}
