//! Parse the markdown an assistant sends back in chat into typed blocks and
//! inline spans, and render messages or whole transcripts through Typst.

mod block;
mod config;
mod error;
mod inline;
mod json;
mod parser;
mod transcript;
mod typst;

use std::time::Instant;

pub use block::{Block, Span};
pub use config::{ColorConfig, Config, DEFAULT_CONFIG, PageConfig, TextConfig};
pub use error::{Error, Result};
pub use transcript::{Message, Role, parse_transcript};

use tracing::debug;
use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions;

/// Parse message text into a vector of blocks.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Split a block's text into bold, italic, code, strikethrough and plain spans.
pub fn render_inline(text: &str) -> Vec<Span> {
    inline::render(text)
}

/// Convert markdown to Typst markup using default config.
pub fn markdown_to_typst(markdown: &str) -> String {
    markdown_to_typst_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to Typst markup with custom config.
pub fn markdown_to_typst_with_config(markdown: &str, config: &Config) -> String {
    let blocks = parse_blocks(markdown);
    typst::blocks_to_typst(&blocks, config)
}

/// Convert a transcript to Typst markup.
pub fn transcript_to_typst(messages: &[Message], config: &Config) -> String {
    transcript::transcript_to_typst(messages, config)
}

/// Parsed blocks with their inline spans, as pretty-printed JSON.
pub fn markdown_to_json(markdown: &str) -> Result<String> {
    let value = json::blocks_to_json(&parse_blocks(markdown))?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// A transcript with each agent message's blocks, as pretty-printed JSON.
pub fn transcript_to_json(messages: &[Message]) -> Result<String> {
    let value = json::transcript_to_json(messages)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Convert markdown to PDF bytes using default config.
pub fn markdown_to_pdf(markdown: &str) -> Result<Vec<u8>> {
    markdown_to_pdf_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to PDF bytes with custom config.
pub fn markdown_to_pdf_with_config(markdown: &str, config: &Config) -> Result<Vec<u8>> {
    typst_to_pdf(markdown_to_typst_with_config(markdown, config))
}

/// Convert a JSON transcript to PDF bytes.
pub fn transcript_to_pdf(json: &str, config: &Config) -> Result<Vec<u8>> {
    let messages = parse_transcript(json)?;
    typst_to_pdf(transcript_to_typst(&messages, config))
}

/// Compile Typst markup to a document.
fn compile_document(typst_content: String) -> Result<PagedDocument> {
    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    let started = Instant::now();
    let doc: PagedDocument = engine
        .compile()
        .output
        .map_err(|e| Error::Compile(format!("{:?}", e)))?;
    debug!(pages = doc.pages.len(), elapsed = ?started.elapsed(), "compiled document");

    Ok(doc)
}

/// Compile Typst markup produced by this crate to PDF bytes.
pub fn typst_to_pdf(typst_content: String) -> Result<Vec<u8>> {
    let doc = compile_document(typst_content)?;

    typst_pdf::pdf(&doc, &PdfOptions::default()).map_err(|e| Error::Pdf(format!("{:?}", e)))
}

/// Result of rendering to SVG pages.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    pub pages: Vec<String>,
    pub width_pt: f64,
    pub height_pt: f64,
}

/// Convert markdown to SVG pages using default config.
pub fn markdown_to_svg(markdown: &str) -> Result<SvgDocument> {
    markdown_to_svg_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to SVG pages with custom config.
pub fn markdown_to_svg_with_config(markdown: &str, config: &Config) -> Result<SvgDocument> {
    typst_to_svg(markdown_to_typst_with_config(markdown, config))
}

/// Compile Typst markup produced by this crate to SVG pages.
pub fn typst_to_svg(typst_content: String) -> Result<SvgDocument> {
    let doc = compile_document(typst_content)?;

    let pages: Vec<String> = doc.pages.iter().map(|page| typst_svg::svg(page)).collect();

    // Get dimensions from first page (assuming all pages same size)
    let (width_pt, height_pt) = if let Some(first_page) = doc.pages.first() {
        let size = first_page.frame.size();
        (size.x.to_pt(), size.y.to_pt())
    } else {
        (340.0, 0.0)
    };

    Ok(SvgDocument {
        pages,
        width_pt,
        height_pt,
    })
}
