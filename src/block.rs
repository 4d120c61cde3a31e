use std::fmt;

use serde::Serialize;

/// Inline text spans with formatting. Spans never nest: the content of a
/// formatted span is kept as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Span {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
    Strikethrough(String),
}

impl Span {
    /// The display text with delimiters stripped.
    pub fn text(&self) -> &str {
        match self {
            Span::Text(text)
            | Span::Bold(text)
            | Span::Italic(text)
            | Span::Code(text)
            | Span::Strikethrough(text) => text,
        }
    }

    /// The markdown delimiter that surrounds this span in source text.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Span::Text(_) => "",
            Span::Bold(_) => "**",
            Span::Italic(_) => "*",
            Span::Code(_) => "`",
            Span::Strikethrough(_) => "~~",
        }
    }
}

/// Writes the span back in its delimited source form.
impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delimiter = self.delimiter();
        write!(f, "{delimiter}{}{delimiter}", self.text())
    }
}

/// Block-level elements parsed from an assistant message.
///
/// Content is kept raw; callers run [`crate::render_inline`] on it when they
/// want styled spans. List items are never grouped: one line, one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        content: String,
    },
    Bullet {
        content: String,
    },
    Ordered {
        index: u64,
        content: String,
    },
    CodeBlock {
        content: String,
    },
    Blockquote {
        content: String,
    },
    #[serde(rename = "hr")]
    Rule,
    Paragraph {
        content: String,
    },
}

impl Block {
    /// Raw text content. Empty for rules.
    pub fn content(&self) -> &str {
        match self {
            Block::Heading { content, .. }
            | Block::Bullet { content }
            | Block::Ordered { content, .. }
            | Block::CodeBlock { content }
            | Block::Blockquote { content }
            | Block::Paragraph { content } => content,
            Block::Rule => "",
        }
    }

    /// Short name used in logs and serialized output.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Bullet { .. } => "bullet",
            Block::Ordered { .. } => "ordered",
            Block::CodeBlock { .. } => "code_block",
            Block::Blockquote { .. } => "blockquote",
            Block::Rule => "hr",
            Block::Paragraph { .. } => "paragraph",
        }
    }

    /// Whether the content of this block is tokenized into inline spans when
    /// rendered. Code blocks are shown verbatim.
    pub fn has_inline_content(&self) -> bool {
        !matches!(self, Block::CodeBlock { .. } | Block::Rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn span_display_restores_delimiters() {
        assert_eq!(Span::Bold("a".into()).to_string(), "**a**");
        assert_eq!(Span::Italic("a".into()).to_string(), "*a*");
        assert_eq!(Span::Code("a".into()).to_string(), "`a`");
        assert_eq!(Span::Strikethrough("a".into()).to_string(), "~~a~~");
        assert_eq!(Span::Text("*a".into()).to_string(), "*a");
    }

    #[test]
    fn block_serializes_with_type_tag() {
        let json = serde_json::to_value(Block::Heading {
            level: 2,
            content: "Balance".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "heading", "level": 2, "content": "Balance"})
        );

        let json = serde_json::to_value(Block::Rule).unwrap();
        assert_eq!(json, serde_json::json!({"type": "hr"}));
    }

    #[test]
    fn span_serializes_with_type_tag() {
        let json = serde_json::to_value(Span::Code("ls".into())).unwrap();
        assert_eq!(json, serde_json::json!({"type": "code", "text": "ls"}));
    }

    #[test]
    fn kind_matches_serialized_tag() {
        let block = Block::Ordered {
            index: 4,
            content: "Pay rent".into(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], block.kind());
        assert_eq!(Block::Rule.kind(), "hr");
    }

    #[test]
    fn rule_has_no_content() {
        assert_eq!(Block::Rule.content(), "");
        assert!(!Block::Rule.has_inline_content());
        assert!(!Block::CodeBlock { content: "x".into() }.has_inline_content());
        assert!(Block::Bullet { content: "x".into() }.has_inline_content());
    }
}
