use std::path::PathBuf;

use thiserror::Error;

/// Errors from rendering and the command line front end.
///
/// Parsing itself never fails; everything here comes from compiling,
/// reading transcripts, or touching the filesystem.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Typst compilation failed: {0}")]
    Compile(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("invalid transcript: {0}")]
    Transcript(#[source] serde_json::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
