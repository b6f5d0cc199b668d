//! Package format detection.
//!
//! Templates are accepted only when `[Content_Types].xml` (or, failing
//! that, the folder layout) identifies a presentation. Word and Excel
//! packages are recognized so the error can say what was passed instead.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::io::{Cursor, Read, Seek};

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Main part content types, keyed by format.
const MAIN_CONTENT_TYPES: [(FormatType, &str); 3] = [
    (
        FormatType::Pptx,
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
    ),
    (
        FormatType::Docx,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
    ),
    (
        FormatType::Xlsx,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
    ),
];

/// Detected Office package format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// PowerPoint presentation (.pptx)
    Pptx,
    /// Word document (.docx)
    Docx,
    /// Excel workbook (.xlsx)
    Xlsx,
}

impl FormatType {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Pptx => "pptx",
            FormatType::Docx => "docx",
            FormatType::Xlsx => "xlsx",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Pptx => "PowerPoint Presentation",
            FormatType::Docx => "Word Document",
            FormatType::Xlsx => "Excel Workbook",
        }
    }

    /// Top-level folder holding this format's parts.
    fn folder(&self) -> &'static str {
        match self {
            FormatType::Pptx => "ppt/",
            FormatType::Docx => "word/",
            FormatType::Xlsx => "xl/",
        }
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the format type from a byte slice.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }
    detect_format_from_reader(Cursor::new(data))
}

/// Detect the format type from a reader.
pub fn detect_format_from_reader<R: Read + Seek>(reader: R) -> Result<FormatType> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            decode_xml_bytes(&bytes)?
        }
        Err(_) => {
            return Err(Error::MissingComponent("[Content_Types].xml".to_string()));
        }
    };

    if let Some((format, _)) = MAIN_CONTENT_TYPES
        .iter()
        .find(|(_, content_type)| content_types.contains(content_type))
    {
        return Ok(*format);
    }

    // Fallback: a single format-specific folder
    let mut found = MAIN_CONTENT_TYPES.iter().map(|(f, _)| *f).filter(|f| {
        archive
            .file_names()
            .any(|name| name.starts_with(f.folder()))
    });
    match (found.next(), found.next()) {
        (Some(format), None) => Ok(format),
        _ => Err(Error::UnknownFormat),
    }
}

/// Fail unless `data` is a presentation package.
pub fn ensure_presentation(data: &[u8]) -> Result<()> {
    match detect_format_from_bytes(data)? {
        FormatType::Pptx => Ok(()),
        other => Err(Error::UnsupportedFormat(format!(
            "expected a PowerPoint Presentation, got a {}",
            other
        ))),
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}
