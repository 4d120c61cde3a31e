use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Bundled default theme, syntax-checked by `build.rs`.
pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub page: PageConfig,
    pub colors: ColorConfig,
    pub text: TextConfig,
}

/// Page geometry. Lengths are Typst length expressions.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PageConfig {
    pub width: String,
    /// `auto` grows the page to fit the message.
    pub height: String,
    pub margin: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: "12cm".to_string(),
            height: "auto".to_string(),
            margin: "12pt".to_string(),
        }
    }
}

/// Hex colours used by the renderer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColorConfig {
    pub text: String,
    pub primary: String,
    pub secondary: String,
    pub border: String,
    pub surface: String,
    pub code_background: String,
    pub quote_background: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            text: "#1A1A1A".to_string(),
            primary: "#2A66BC".to_string(),
            secondary: "#6E7A8A".to_string(),
            border: "#E0E6ED".to_string(),
            surface: "#F5F7FA".to_string(),
            code_background: "#EBF3FF".to_string(),
            quote_background: "#EBF3FF".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TextConfig {
    /// Font family. Falls back to Typst's embedded default when unset.
    pub font: Option<String>,
    pub size: String,
    pub h1_size: String,
    pub h2_size: String,
    pub h3_size: String,
    pub code_size: String,
    pub quote_size: String,
    pub bullet: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font: None,
            size: "15pt".to_string(),
            h1_size: "18pt".to_string(),
            h2_size: "17pt".to_string(),
            h3_size: "16pt".to_string(),
            code_size: "13pt".to_string(),
            quote_size: "14pt".to_string(),
            bullet: "•".to_string(),
        }
    }
}

impl TextConfig {
    /// Get the font size for a heading level.
    /// Returns None for levels the parser never produces.
    pub fn size_for_heading(&self, level: u8) -> Option<&str> {
        match level {
            1 => Some(self.h1_size.as_str()),
            2 => Some(self.h2_size.as_str()),
            3 => Some(self.h3_size.as_str()),
            _ => None,
        }
    }
}

impl Config {
    /// The theme bundled with the binary.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
            warn!(error = %e, "bundled config does not match the schema, using built-in values");
            Self::default()
        })
    }

    /// Load config from a TOML file, or return defaults if not found.
    /// A file that fails to parse is reported and replaced by the defaults.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    debug!(path = %path.display(), "loaded config");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::compiled_default()
                }
            },
            Err(_) => Self::compiled_default(),
        }
    }
}
