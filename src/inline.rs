use std::sync::LazyLock;

use regex::Regex;

use crate::block::Span;

// Alternation order decides ties at the same start: `**` before `*`.
// Span bodies stop at any line terminator, `\r` included.
static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\*\*([^\r\n\x{2028}\x{2029}]+?)\*\*",
        r"|\*([^\r\n\x{2028}\x{2029}]+?)\*",
        r"|`([^`]+)`",
        r"|~~([^\r\n\x{2028}\x{2029}]+?)~~",
    ))
    .expect("inline pattern")
});

/// Split a line of text into styled spans.
///
/// Single pass, first match wins, no nesting. Unmatched delimiters stay in the
/// surrounding text span. The empty string yields one empty text span.
pub fn render(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in INLINE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };

        if whole.start() > last {
            spans.push(Span::Text(text[last..whole.start()].to_string()));
        }

        let span = match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
            (Some(m), ..) => Span::Bold(m.as_str().to_string()),
            (_, Some(m), ..) => Span::Italic(m.as_str().to_string()),
            (_, _, Some(m), _) => Span::Code(m.as_str().to_string()),
            (_, _, _, Some(m)) => Span::Strikethrough(m.as_str().to_string()),
            _ => Span::Text(whole.as_str().to_string()),
        };
        spans.push(span);

        last = whole.end();
    }

    if last < text.len() {
        spans.push(Span::Text(text[last..].to_string()));
    }

    if spans.is_empty() {
        spans.push(Span::Text(text.to_string()));
    }

    spans
}
