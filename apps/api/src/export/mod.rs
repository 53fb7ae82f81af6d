// Document export: Markdown, Word and PDF renditions of generated text.
// All three formats start from the same Markdown-ish text the writers produce.
// Rendering is CPU-bound; handlers call `export` inside spawn_blocking.

pub mod docx;
pub mod font_metrics;
pub mod handlers;
pub mod pdf;

use std::str::FromStr;

use thiserror::Error;

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unknown export format '{0}'. Use md, docx or pdf.")]
    UnknownFormat(String),

    #[error("Unknown document '{0}'. Use resume or cover-letter.")]
    UnknownDocument(String),

    #[error("DOCX rendering failed: {0}")]
    Docx(String),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::UnknownFormat(_) | ExportError::UnknownDocument(_) => {
                AppError::Validation(e.to_string())
            }
            ExportError::Docx(_) | ExportError::Pdf(_) => AppError::Internal(e.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Docx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "docx" => Ok(ExportFormat::Docx),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Which saved output to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Resume,
    CoverLetter,
}

impl Document {
    pub fn title(self) -> &'static str {
        match self {
            Document::Resume => "ATS Resume",
            Document::CoverLetter => "Cover Letter",
        }
    }

    pub fn file_stem(self) -> &'static str {
        match self {
            Document::Resume => "ats_resume",
            Document::CoverLetter => "cover_letter",
        }
    }

    pub fn filename(self, format: ExportFormat) -> String {
        format!("{}.{}", self.file_stem(), format.extension())
    }
}

impl FromStr for Document {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resume" => Ok(Document::Resume),
            "cover-letter" | "cover_letter" => Ok(Document::CoverLetter),
            other => Err(ExportError::UnknownDocument(other.to_string())),
        }
    }
}

/// UTF-8 passthrough.
pub fn to_markdown(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

pub fn export(format: ExportFormat, title: &str, text: &str) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Markdown => Ok(to_markdown(text)),
        ExportFormat::Docx => docx::to_docx(text),
        ExportFormat::Pdf => pdf::to_pdf(title, text),
    }
}

/// One line of the Markdown-ish input, classified for the binary renderers.
/// Only `# ` and `## ` are headings; deeper levels stay literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Block<'a> {
    Heading(u8, &'a str),
    Blank,
    Text(&'a str),
}

pub(crate) fn classify_line(line: &str) -> Block<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Block::Blank;
    }
    if let Some(rest) = trimmed.strip_prefix("## ") {
        return Block::Heading(2, rest.trim());
    }
    if let Some(rest) = trimmed.strip_prefix("# ") {
        return Block::Heading(1, rest.trim());
    }
    Block::Text(trimmed)
}

/// Drops `**bold**` / `__bold__` markers the renderers cannot express inline.
pub(crate) fn strip_inline_markup(text: &str) -> String {
    text.replace("**", "").replace("__", "")
}
