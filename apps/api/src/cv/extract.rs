//! Text extraction from uploaded CV documents.
//!
//! PDF goes through `pdf-extract`; DOCX (and legacy DOC files that are really
//! OOXML containers) through `docx-rs`.

use std::panic;
use std::path::Path;

use thiserror::Error;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const ALLOWED_TYPES: &[&str] = &[MIME_PDF, MIME_DOC, MIME_DOCX];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File size {size} exceeds maximum allowed size {max}")]
    TooLarge { size: usize, max: usize },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Word document extraction failed: {0}")]
    Word(String),
}

/// Resolves the effective MIME type; a known file extension wins over the
/// client-declared type.
pub fn resolve_file_type(declared_mime: Option<&str>, original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => MIME_PDF.to_string(),
        Some("doc") => MIME_DOC.to_string(),
        Some("docx") => MIME_DOCX.to_string(),
        _ => declared_mime
            .unwrap_or("application/octet-stream")
            .to_string(),
    }
}

pub fn validate_file_type(file_type: &str) -> Result<(), ExtractError> {
    if ALLOWED_TYPES.contains(&file_type) {
        Ok(())
    } else {
        Err(ExtractError::UnsupportedType(file_type.to_string()))
    }
}

pub fn validate_file_size(size: usize, max: usize) -> Result<(), ExtractError> {
    if size > max {
        return Err(ExtractError::TooLarge { size, max });
    }
    Ok(())
}

/// File extension used for the stored object name.
pub fn extension_for(file_type: &str) -> &'static str {
    match file_type {
        MIME_PDF => "pdf",
        MIME_DOC => "doc",
        MIME_DOCX => "docx",
        _ => "bin",
    }
}

/// Extracts plain text. CPU-bound; call from `spawn_blocking`.
pub fn extract_text(data: &[u8], file_type: &str) -> Result<String, ExtractError> {
    match file_type {
        MIME_PDF => extract_text_from_pdf(data),
        MIME_DOC | MIME_DOCX => extract_text_from_word(data),
        other => Err(ExtractError::UnsupportedType(other.to_string())),
    }
}

/// `pdf-extract` panics on some structurally broken documents; those are
/// reported as extraction failures.
fn extract_text_from_pdf(data: &[u8]) -> Result<String, ExtractError> {
    panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data))
        .map_err(|_| ExtractError::Pdf("panic while parsing PDF".to_string()))?
        .map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn extract_text_from_word(data: &[u8]) -> Result<String, ExtractError> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let docx = docx_rs::read_docx(data).map_err(|e| ExtractError::Word(e.to_string()))?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            for pc in &p.children {
                if let ParagraphChild::Run(run) = pc {
                    for rc in &run.children {
                        match rc {
                            RunChild::Text(t) => text.push_str(&t.text),
                            RunChild::Tab(_) => text.push('\t'),
                            RunChild::Break(_) => text.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

/// Human-readable file size, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut i = 0;
    while value >= 1024.0 && i < UNITS.len() - 1 {
        value /= 1024.0;
        i += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[i])
}
