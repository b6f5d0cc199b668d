//! Error types for the deckfill library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for deckfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, filling or saving a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The template file does not exist.
    #[error("Template file not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// The template does not have the slide layout the generator expects.
    #[error("Expected a template with exactly {expected} slides, but found {found}")]
    SlideCountMismatch {
        /// Slides the generator fills
        expected: usize,
        /// Slides present in the template
        found: usize,
    },

    /// The file format could not be determined.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading or writing the ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data in the document.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required document component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// An uploaded image is not in a format a slide can embed.
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// The deck form could not be read.
    #[error("Invalid form: {0}")]
    Form(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Form(err.to_string())
    }
}
