//! # deckfill
//!
//! Fill a fixed PowerPoint template with the contents of a deck form.
//!
//! The template carries placeholder markers (`[TOPIC]`, `[TITLE-3]`,
//! `[SYNTAX]`, ...) in its text and sample pictures on its content slides.
//! The generator replaces the markers with the form's text and swaps the
//! pictures for the form's images, keeping their position and size, then
//! returns the result as a downloadable `.pptx`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use deckfill::generate_file;
//!
//! let deck = generate_file("Template.pptx", "form.json")?;
//! std::fs::write(&deck.file_name, &deck.bytes)?;
//! # Ok::<(), deckfill::Error>(())
//! ```
//!
//! ## Working with the Pieces
//!
//! ```no_run
//! use deckfill::{DeckForm, GenerateOptions, Generator};
//!
//! let form = DeckForm::load("form.json")?;
//! let content = form.resolve(".")?;
//!
//! let generator = Generator::new(GenerateOptions::new().with_template("decks/base.pptx"));
//! let deck = generator.generate(&content)?;
//! deck.save_to_dir("out")?;
//! # Ok::<(), deckfill::Error>(())
//! ```
//!
//! ## Features
//!
//! - `async`: Async I/O support with Tokio

pub mod container;
pub mod detect;
pub mod error;
pub mod form;
pub mod generate;
pub mod model;
pub mod pptx;
pub mod substitute;
pub mod xml;

// Re-exports
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use detect::{detect_format_from_bytes, FormatType};
pub use error::{Error, Result};
pub use form::{ContentSlideForm, DeckForm};
pub use generate::{
    ContentSlide, DeckContent, GenerateOptions, GeneratedDeck, Generator, PPTX_MIME_TYPE,
};
pub use model::{
    Bounds, Image, ImageFormat, Placement, PlaceholderRef, Shape, ShapeTree, Slide, SlideSummary,
    Traversal,
};
pub use pptx::Presentation;

use std::path::Path;

/// Generate a deck from a template and a form file.
///
/// Image paths in the form are resolved against the form's directory.
pub fn generate_file(
    template: impl AsRef<Path>,
    form_path: impl AsRef<Path>,
) -> Result<GeneratedDeck> {
    let form_path = form_path.as_ref();
    let form = DeckForm::load(form_path)?;
    let content = form.resolve(form_dir(form_path))?;

    Generator::new(GenerateOptions::new().with_template(template.as_ref())).generate(&content)
}

/// Async variant of [`generate_file`]: the template, form and images are
/// read with `tokio::fs`, the substitution itself runs inline.
#[cfg(feature = "async")]
pub async fn generate_file_async(
    template: impl AsRef<Path>,
    form_path: impl AsRef<Path>,
) -> Result<GeneratedDeck> {
    let template = template.as_ref();
    let form_path = form_path.as_ref();

    let json = tokio::fs::read_to_string(form_path).await?;
    let form = DeckForm::from_json(&json)?;
    let content = form.resolve_async(form_dir(form_path)).await?;

    let data = match tokio::fs::read(template).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::TemplateNotFound(template.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    let presentation = Presentation::from_bytes(data)?;

    Generator::new(GenerateOptions::new().with_template(template))
        .generate_from(presentation, &content)
}

fn form_dir(form_path: &Path) -> &Path {
    form_path.parent().unwrap_or_else(|| Path::new("."))
}
