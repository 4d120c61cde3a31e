use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::block::Block;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,3})\s+(.+)").expect("heading pattern"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.+)").expect("bullet pattern"));
static ORDERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+)[.)]\s+(.+)").expect("ordered pattern"));

// Looser openers that end a running paragraph. A line can end a paragraph
// without itself parsing as the block it looks like (e.g. "- " with no text).
static HEADING_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,3}\s").expect("heading start pattern"));
static BULLET_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s").expect("bullet start pattern"));
static ORDERED_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[0-9]+[.)]\s").expect("ordered start pattern"));

/// What a single line opens, checked in precedence order.
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Fence,
    Rule,
    Heading { level: u8, content: &'a str },
    Bullet { content: &'a str },
    Ordered { index: u64, content: &'a str },
    Quote,
    Blank,
    Text,
}

fn classify(line: &str) -> LineKind<'_> {
    if is_fence(line) {
        return LineKind::Fence;
    }
    if is_rule(line) {
        return LineKind::Rule;
    }
    if let Some(caps) = HEADING.captures(line) {
        // The first group is 1-3 ASCII '#' characters.
        let level = caps[1].len() as u8;
        return LineKind::Heading {
            level,
            content: caps.get(2).map_or("", |m| m.as_str().trim()),
        };
    }
    if let Some(caps) = BULLET.captures(line) {
        return LineKind::Bullet {
            content: caps.get(1).map_or("", |m| m.as_str().trim()),
        };
    }
    if let Some(caps) = ORDERED.captures(line) {
        // Only overflow can fail here; very long numbers saturate.
        let index = caps[1].parse().unwrap_or(u64::MAX);
        return LineKind::Ordered {
            index,
            content: caps.get(2).map_or("", |m| m.as_str().trim()),
        };
    }
    if line.starts_with('>') {
        return LineKind::Quote;
    }
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    LineKind::Text
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Three or more of the same rule character, whitespace ignored.
fn is_rule(line: &str) -> bool {
    let mut marks = line.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    let mut count = 1;
    for mark in marks {
        if mark != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

fn interrupts_paragraph(line: &str) -> bool {
    line.trim().is_empty()
        || is_fence(line)
        || HEADING_START.is_match(line)
        || BULLET_START.is_match(line)
        || ORDERED_START.is_match(line)
        || line.starts_with('>')
}

/// Drop the leading `>` and at most one whitespace character after it.
fn strip_quote_marker(line: &str) -> &str {
    let rest = line.strip_prefix('>').unwrap_or(line);
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        _ => rest,
    }
}

/// Parse message text into a list of blocks.
///
/// Never fails: anything that matches no other rule becomes a paragraph, and
/// an unterminated code fence is closed at the end of the input.
pub fn parse(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        match classify(line) {
            LineKind::Fence => {
                let start = i + 1;
                let mut end = start;
                while end < lines.len() && !is_fence(lines[end]) {
                    end += 1;
                }
                if end >= lines.len() {
                    trace!(line = i + 1, "code fence left open, closing at end of input");
                }
                blocks.push(Block::CodeBlock {
                    content: lines[start..end].join("\n"),
                });
                // Skip the closing fence as well
                i = end + 1;
            }
            LineKind::Rule => {
                blocks.push(Block::Rule);
                i += 1;
            }
            LineKind::Heading { level, content } => {
                blocks.push(Block::Heading {
                    level,
                    content: content.to_string(),
                });
                i += 1;
            }
            LineKind::Bullet { content } => {
                blocks.push(Block::Bullet {
                    content: content.to_string(),
                });
                i += 1;
            }
            LineKind::Ordered { index, content } => {
                blocks.push(Block::Ordered {
                    index,
                    content: content.to_string(),
                });
                i += 1;
            }
            LineKind::Quote => {
                let mut quoted = vec![strip_quote_marker(line)];
                i += 1;
                while i < lines.len() && lines[i].starts_with('>') {
                    quoted.push(strip_quote_marker(lines[i]));
                    i += 1;
                }
                blocks.push(Block::Blockquote {
                    content: quoted.join("\n"),
                });
            }
            LineKind::Blank => {
                i += 1;
            }
            LineKind::Text => {
                let mut paragraph = vec![line];
                i += 1;
                while i < lines.len() && !interrupts_paragraph(lines[i]) {
                    paragraph.push(lines[i]);
                    i += 1;
                }
                blocks.push(Block::Paragraph {
                    content: paragraph.join(" "),
                });
            }
        }
    }

    debug!(lines = lines.len(), blocks = blocks.len(), "parsed message");
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn heading(level: u8, content: &str) -> Block {
        Block::Heading {
            level,
            content: content.to_string(),
        }
    }

    fn bullet(content: &str) -> Block {
        Block::Bullet {
            content: content.to_string(),
        }
    }

    fn ordered(index: u64, content: &str) -> Block {
        Block::Ordered {
            index,
            content: content.to_string(),
        }
    }

    fn code(content: &str) -> Block {
        Block::CodeBlock {
            content: content.to_string(),
        }
    }

    fn quote(content: &str) -> Block {
        Block::Blockquote {
            content: content.to_string(),
        }
    }

    fn paragraph(content: &str) -> Block {
        Block::Paragraph {
            content: content.to_string(),
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse(""), vec![]);
        assert_eq!(parse("\n"), vec![]);
        assert_eq!(parse("\n\n\n"), vec![]);
        assert_eq!(parse("   \n\t\n"), vec![]);
    }

    #[test]
    fn headings() {
        assert_eq!(parse("# Title"), vec![heading(1, "Title")]);
        assert_eq!(parse("## Sub"), vec![heading(2, "Sub")]);
        assert_eq!(parse("###   Spaced out  "), vec![heading(3, "Spaced out")]);
    }

    #[test]
    fn deep_heading_is_paragraph() {
        assert_eq!(parse("#### Deep"), vec![paragraph("#### Deep")]);
        assert_eq!(parse("#NoSpace"), vec![paragraph("#NoSpace")]);
    }

    #[test]
    fn bullets_stay_separate() {
        assert_eq!(parse("- a\n- b"), vec![bullet("a"), bullet("b")]);
        assert_eq!(
            parse("* one\n+ two\n  - indented"),
            vec![bullet("one"), bullet("two"), bullet("indented")]
        );
    }

    #[test]
    fn ordered_keeps_written_index() {
        assert_eq!(
            parse("3. third\n7) seventh\n1. first"),
            vec![ordered(3, "third"), ordered(7, "seventh"), ordered(1, "first")]
        );
    }

    #[test]
    fn ordered_index_saturates() {
        assert_eq!(
            parse("123456789012345678901234567890. huge"),
            vec![ordered(u64::MAX, "huge")]
        );
    }

    #[test]
    fn fenced_code() {
        assert_eq!(parse("```\ncode here\n```"), vec![code("code here")]);
        assert_eq!(
            parse("```rust\nfn main() {\n    **not bold**\n}\n```\nafter"),
            vec![code("fn main() {\n    **not bold**\n}"), paragraph("after")]
        );
    }

    #[test]
    fn fence_with_blank_lines_inside() {
        assert_eq!(parse("```\na\n\nb\n```"), vec![code("a\n\nb")]);
    }

    #[test]
    fn unterminated_fence_closes_at_end_of_input() {
        assert_eq!(
            parse("```python\nprint(1)\nprint(2)"),
            vec![code("print(1)\nprint(2)")]
        );
        assert_eq!(parse("```"), vec![code("")]);
        assert_eq!(parse("text\n```"), vec![paragraph("text"), code("")]);
    }

    #[test]
    fn indented_fence() {
        assert_eq!(parse("  ```\nx\n  ```"), vec![code("x")]);
    }

    #[test]
    fn horizontal_rules() {
        assert_eq!(parse("---"), vec![Block::Rule]);
        assert_eq!(parse("***"), vec![Block::Rule]);
        assert_eq!(parse("___"), vec![Block::Rule]);
        assert_eq!(parse("  - - - -"), vec![Block::Rule]);
    }

    #[test]
    fn rule_wins_over_bullet() {
        assert_eq!(parse("* * *"), vec![Block::Rule]);
    }

    #[test]
    fn mixed_rule_characters_are_not_a_rule() {
        assert_eq!(parse("-*-"), vec![paragraph("-*-")]);
        assert_eq!(parse("--"), vec![paragraph("--")]);
    }

    #[test]
    fn blockquote_lines_are_joined() {
        assert_eq!(parse("> quoted\n> more"), vec![quote("quoted\nmore")]);
    }

    #[test]
    fn blockquote_strips_one_space() {
        assert_eq!(parse(">tight\n>  loose"), vec![quote("tight\n loose")]);
        assert_eq!(parse(">"), vec![quote("")]);
    }

    #[test]
    fn blockquote_ends_at_blank_or_plain_line() {
        assert_eq!(parse("> a\n\n> b"), vec![quote("a"), quote("b")]);
        assert_eq!(parse("> a\nplain"), vec![quote("a"), paragraph("plain")]);
    }

    #[test]
    fn paragraph_lines_joined_with_space() {
        assert_eq!(
            parse("Some text\nmore text\n\n# Heading"),
            vec![paragraph("Some text more text"), heading(1, "Heading")]
        );
    }

    #[test]
    fn heading_interrupts_paragraph() {
        assert_eq!(
            parse("Intro\n## Details\nBody"),
            vec![paragraph("Intro"), heading(2, "Details"), paragraph("Body")]
        );
    }

    #[test]
    fn list_and_quote_interrupt_paragraph() {
        assert_eq!(
            parse("Your accounts:\n- Checking\n2. Savings\n> note"),
            vec![
                paragraph("Your accounts:"),
                bullet("Checking"),
                ordered(2, "Savings"),
                quote("note"),
            ]
        );
    }

    #[test]
    fn rule_does_not_interrupt_paragraph() {
        assert_eq!(parse("text\n---\nmore"), vec![paragraph("text --- more")]);
    }

    #[test]
    fn bare_marker_ends_paragraph_but_is_not_a_list_item() {
        assert_eq!(parse("text\n- "), vec![paragraph("text"), paragraph("- ")]);
    }

    #[test]
    fn mixed_message() {
        let md = "## Recent spending\n\nYou spent **$42** on food.\n\n1. Groceries\n2. Coffee\n\n---\n\n> Tip: set a budget";
        assert_eq!(
            parse(md),
            vec![
                heading(2, "Recent spending"),
                paragraph("You spent **$42** on food."),
                ordered(1, "Groceries"),
                ordered(2, "Coffee"),
                Block::Rule,
                quote("Tip: set a budget"),
            ]
        );
    }

    #[test]
    fn terminates_on_odd_input() {
        for input in [
            "```\n```\n```",
            ">\n>\n>",
            "\r\n\r\n",
            "# \n## \n### ",
            "- \n* \n+ ",
            "1.\n2)\n",
            "\u{0}\u{1}\u{7f}",
        ] {
            let _ = parse(input);
        }
    }

    #[test]
    fn classify_precedence() {
        assert_eq!(classify("```js"), LineKind::Fence);
        assert_eq!(classify("- - -"), LineKind::Rule);
        assert_eq!(
            classify("# x"),
            LineKind::Heading {
                level: 1,
                content: "x"
            }
        );
        assert_eq!(classify("> x"), LineKind::Quote);
        assert_eq!(classify(" "), LineKind::Blank);
        assert_eq!(classify("plain"), LineKind::Text);
    }
}
