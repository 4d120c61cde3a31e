use tracing::trace;

use crate::block::{Block, Span};
use crate::config::Config;
use crate::inline;

/// Convert blocks to Typst markup
pub fn blocks_to_typst(blocks: &[Block], config: &Config) -> String {
    let mut out = preamble(config);
    emit_blocks(blocks, config, &mut out);
    out
}

/// Page, text and heading setup shared by single messages and transcripts.
pub(crate) fn preamble(config: &Config) -> String {
    let page = &config.page;
    let text = &config.text;
    let mut out = String::new();

    out.push_str(&format!(
        "#set page(width: {}, height: {}, margin: {})\n",
        page.width, page.height, page.margin
    ));
    out.push_str(&format!(
        "#set text(size: {}, fill: {})\n",
        text.size,
        rgb(&config.colors.text)
    ));
    if let Some(font) = &text.font {
        out.push_str(&format!("#set text(font: {})\n", typst_string(font)));
    }
    out.push_str("#set par(linebreaks: \"optimized\")\n");
    out.push_str(&format!("#show raw: set text(size: {})\n", text.code_size));
    for level in 1..=3 {
        if let Some(size) = text.size_for_heading(level) {
            out.push_str(&format!(
                "#show heading.where(level: {level}): set text(size: {size})\n"
            ));
        }
    }
    out.push('\n');
    out
}

pub(crate) fn emit_blocks(blocks: &[Block], config: &Config, out: &mut String) {
    let mut i = 0;
    while i < blocks.len() {
        let block = &blocks[i];

        match block {
            Block::Heading { .. } => {
                // Keep heading with following content using a block that prevents breaks
                out.push_str("#block(breakable: false)[\n");
                emit_block(block, config, out);

                if i + 1 < blocks.len() {
                    i += 1;
                    emit_block(&blocks[i], config, out);
                }
                out.push_str("]\n\n");
            }
            _ => {
                emit_block(block, config, out);
            }
        }

        i += 1;
    }
}

fn emit_block(block: &Block, config: &Config, out: &mut String) {
    trace!(kind = block.kind(), "emitting block");
    let colors = &config.colors;

    match block {
        Block::Heading { level, content } => {
            for _ in 0..*level {
                out.push('=');
            }
            out.push(' ');
            inline_to_typst(content, config, out);
            out.push_str("\n\n");
        }
        Block::Paragraph { content } => {
            inline_to_typst(content, config, out);
            out.push_str("\n\n");
        }
        Block::Bullet { content } => {
            out.push_str(&format!(
                "#grid(columns: (14pt, 1fr), column-gutter: 6pt, text(fill: {}, {}), [",
                rgb(&colors.primary),
                typst_string(&config.text.bullet)
            ));
            inline_to_typst(content, config, out);
            out.push_str("])\n\n");
        }
        Block::Ordered { index, content } => {
            out.push_str(&format!(
                "#grid(columns: (20pt, 1fr), column-gutter: 6pt, text(fill: {}, weight: \"semibold\", \"{index}.\"), [",
                rgb(&colors.primary)
            ));
            inline_to_typst(content, config, out);
            out.push_str("])\n\n");
        }
        Block::CodeBlock { content } => {
            out.push_str(&format!(
                "#block(fill: {}, inset: 12pt, radius: 10pt, width: 100%, raw(block: true, {}))\n\n",
                rgb(&colors.surface),
                typst_string(content)
            ));
        }
        Block::Blockquote { content } => {
            out.push_str(&format!(
                "#block(fill: {}, stroke: (left: 3pt + {}), inset: (left: 12pt, right: 8pt, y: 6pt), radius: 4pt, width: 100%, text(size: {}, style: \"italic\")[",
                rgb(&colors.quote_background),
                rgb(&colors.primary),
                config.text.quote_size
            ));
            inline_to_typst(content, config, out);
            out.push_str("])\n\n");
        }
        Block::Rule => {
            out.push_str(&format!(
                "#line(length: 100%, stroke: 1pt + {})\n\n",
                rgb(&colors.border)
            ));
        }
    }
}

fn inline_to_typst(text: &str, config: &Config, out: &mut String) {
    for span in inline::render(text) {
        span_to_typst(&span, config, out);
    }
}

// Formatted spans are function calls closed with `;` so that text directly
// after them is never read as call arguments or field access.
fn span_to_typst(span: &Span, config: &Config, out: &mut String) {
    let colors = &config.colors;

    match span {
        Span::Text(text) => escape_markup(text, out),
        Span::Bold(text) => {
            out.push_str("#strong[");
            escape_markup(text, out);
            out.push_str("];");
        }
        Span::Italic(text) => {
            out.push_str("#emph[");
            escape_markup(text, out);
            out.push_str("];");
        }
        Span::Code(text) => {
            out.push_str(&format!(
                "#box(fill: {}, inset: (x: 4pt), outset: (y: 2pt), radius: 4pt, text(fill: {}, raw({})));",
                rgb(&colors.code_background),
                rgb(&colors.primary),
                typst_string(text)
            ));
        }
        Span::Strikethrough(text) => {
            out.push_str(&format!("#text(fill: {}, strike[", rgb(&colors.secondary)));
            escape_markup(text, out);
            out.push_str("]);");
        }
    }
}

/// Escape text for Typst markup. Newlines become forced line breaks.
pub(crate) fn escape_markup(text: &str, out: &mut String) {
    for (n, line) in text.split('\n').enumerate() {
        if n > 0 {
            out.push_str(" \\\n");
        }
        escape_line(line, out);
    }
}

// A digit run followed by `.` at the start of a line is a Typst list marker.
fn escape_line(line: &str, out: &mut String) {
    let indent = line.len() - line.trim_start().len();
    let digits = line[indent..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    let marker_dot = (digits > 0 && line[indent + digits..].starts_with('.'))
        .then_some(indent + digits);

    for (i, ch) in line.char_indices() {
        if Some(i) == marker_dot {
            out.push_str("\\.");
            continue;
        }
        match ch {
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '~' | '/' | '-'
            | '+' | '=' => {
                out.push('\\');
                out.push(ch);
            }
            '\r' => {}
            _ => out.push(ch),
        }
    }
}

/// Quote a value as a Typst string literal.
pub(crate) fn typst_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

pub(crate) fn rgb(hex: &str) -> String {
    format!("rgb({})", typst_string(hex))
}
