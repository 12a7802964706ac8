//! Export renderers for chapters and the story bible.
//!
//! Renderers are pure: they take already-loaded chapters or a
//! [`BibleSnapshot`](crate::bible::BibleSnapshot) and produce bytes. Choosing
//! what to export and naming the file is the service layer's job.

pub mod docx;
pub mod markdown;
pub mod text;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub use docx::render_chapters_docx;
pub use markdown::{render_bible_markdown, render_chapters_markdown};
pub use text::render_chapters_text;

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Markdown,
    Text,
    Docx,
    Json,
}

impl ExportFormat {
    /// Parse a format name. Accepts the usual file extensions as aliases.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "text" | "txt" => Ok(Self::Text),
            "docx" => Ok(Self::Docx),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "Invalid export format '{other}'. Must be one of: markdown, text, docx, json"
            )),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Text => "txt",
            Self::Docx => "docx",
            Self::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Text => "text/plain; charset=utf-8",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Json => "application/json",
        }
    }
}

// ---------------------------------------------------------------------------
// Chapter input
// ---------------------------------------------------------------------------

/// A chapter as the renderers see it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportChapter {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ExportChapter {
    /// Display title; untitled chapters are numbered by export position
    /// (`index` is zero-based).
    pub fn display_title(&self, index: usize) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("Chapter {}", index + 1),
        }
    }

    /// Non-blank content lines with trailing whitespace removed.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.content
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect()
    }
}

/// Render chapters in one of the chapter formats.
pub fn render_chapters(format: ExportFormat, chapters: &[ExportChapter]) -> Result<Vec<u8>, CoreError> {
    match format {
        ExportFormat::Markdown => Ok(render_chapters_markdown(chapters).into_bytes()),
        ExportFormat::Text => Ok(render_chapters_text(chapters).into_bytes()),
        ExportFormat::Docx => render_chapters_docx(chapters),
        ExportFormat::Json => Err(CoreError::Validation(
            "json export is only available for the story bible".to_string(),
        )),
    }
}
