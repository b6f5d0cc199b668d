//! The deck form: what a user fills in, as JSON.
//!
//! ```json
//! {
//!   "title": "Intro to Python",
//!   "subtopics": "Loops, Functions",
//!   "agenda": "Introduction,Loops,Functions",
//!   "slides": [
//!     { "topic": "Loops", "syntax": "for x in xs:", "explanation": "...",
//!       "images": ["img/loop.png", "img/loop_out.png"] }
//!   ],
//!   "summary": "Loops,Functions,Summary"
//! }
//! ```
//!
//! Image paths are relative to the form file.

use crate::error::Result;
use crate::generate::{ContentSlide, DeckContent, CONTENT_SLIDE_COUNT, MAX_IMAGES_PER_SLIDE};
use crate::model::Image;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Form fields for one content slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSlideForm {
    pub topic: String,
    pub syntax: String,
    pub explanation: String,
    /// Implementation image, then output image
    pub images: Vec<PathBuf>,
}

/// A submitted deck form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckForm {
    pub title: String,
    /// Comma-separated, inserted verbatim
    pub subtopics: String,
    /// Comma-separated agenda items
    pub agenda: String,
    pub slides: Vec<ContentSlideForm>,
    /// Comma-separated summary items
    pub summary: String,
}

impl DeckForm {
    /// An empty form with every content slide present.
    pub fn blank() -> Self {
        Self {
            slides: vec![ContentSlideForm::default(); CONTENT_SLIDE_COUNT],
            ..Default::default()
        }
    }

    /// Parse a form from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a form file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load the images and split the lists, resolving image paths against
    /// `base_dir`.
    pub fn resolve(&self, base_dir: impl AsRef<Path>) -> Result<DeckContent> {
        let base_dir = base_dir.as_ref();
        let mut slides = Vec::new();
        for (i, form) in self.content_slides().iter().enumerate() {
            let images = form
                .image_paths(i)
                .iter()
                .map(|p| Image::open(base_dir.join(p)))
                .collect::<Result<Vec<_>>>()?;
            slides.push(form.to_content(images));
        }
        Ok(self.to_content(slides))
    }

    /// Async variant of [`DeckForm::resolve`], reading images with tokio.
    #[cfg(feature = "async")]
    pub async fn resolve_async(&self, base_dir: impl AsRef<Path>) -> Result<DeckContent> {
        let base_dir = base_dir.as_ref();
        let mut slides = Vec::new();
        for (i, form) in self.content_slides().iter().enumerate() {
            let mut images = Vec::new();
            for path in form.image_paths(i) {
                let path = base_dir.join(path);
                let data = tokio::fs::read(&path).await?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned());
                images.push(Image::from_bytes(data, name)?);
            }
            slides.push(form.to_content(images));
        }
        Ok(self.to_content(slides))
    }

    fn content_slides(&self) -> &[ContentSlideForm] {
        if self.slides.len() > CONTENT_SLIDE_COUNT {
            warn!(
                "Form has {} content slides, only the first {} are used",
                self.slides.len(),
                CONTENT_SLIDE_COUNT
            );
            &self.slides[..CONTENT_SLIDE_COUNT]
        } else {
            &self.slides
        }
    }

    fn to_content(&self, slides: Vec<ContentSlide>) -> DeckContent {
        DeckContent {
            title: self.title.clone(),
            subtopics: self.subtopics.clone(),
            agenda: split_list(&self.agenda),
            slides,
            summary: split_list(&self.summary),
        }
    }
}

impl ContentSlideForm {
    fn image_paths(&self, index: usize) -> &[PathBuf] {
        if self.images.len() > MAX_IMAGES_PER_SLIDE {
            warn!(
                "Content slide {}: {} images given, only the first {} are used",
                index + 1,
                self.images.len(),
                MAX_IMAGES_PER_SLIDE
            );
            &self.images[..MAX_IMAGES_PER_SLIDE]
        } else {
            &self.images
        }
    }

    fn to_content(&self, images: Vec<Image>) -> ContentSlide {
        ContentSlide {
            topic: self.topic.clone(),
            syntax: self.syntax.clone(),
            explanation: self.explanation.clone(),
            images,
        }
    }
}

/// Split a comma-separated list. Items are kept verbatim, surrounding
/// spaces included, and empty items keep their position.
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::ImageFormat;

    const PNG: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("Loops, Functions ,Classes"),
            vec!["Loops", " Functions ", "Classes"]
        );
        assert_eq!(split_list("a,,c"), vec!["a", "", "c"]);
        assert_eq!(split_list(""), vec![""]);
    }

    #[test]
    fn test_from_json_defaults_missing_fields() {
        let form = DeckForm::from_json(r#"{"title": "Rust", "slides": [{"topic": "Ownership"}]}"#)
            .unwrap();
        assert_eq!(form.title, "Rust");
        assert_eq!(form.agenda, "");
        assert_eq!(form.slides.len(), 1);
        assert_eq!(form.slides[0].topic, "Ownership");
        assert!(form.slides[0].images.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let err = DeckForm::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Form(_)));
    }

    #[test]
    fn test_blank_form_round_trip() {
        let blank = DeckForm::blank();
        assert_eq!(blank.slides.len(), CONTENT_SLIDE_COUNT);
        let json = blank.to_json_pretty().unwrap();
        assert_eq!(DeckForm::from_json(&json).unwrap(), blank);
    }

    #[test]
    fn test_resolve_loads_images_relative_to_base() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("img")).unwrap();
        std::fs::write(dir.path().join("img/a.png"), PNG).unwrap();
        std::fs::write(dir.path().join("img/b.png"), PNG).unwrap();

        let form = DeckForm {
            title: "Intro to Python".to_string(),
            agenda: "Intro,Loops".to_string(),
            slides: vec![ContentSlideForm {
                topic: "Loops".to_string(),
                images: vec!["img/a.png".into(), "img/b.png".into(), "img/c.png".into()],
                ..Default::default()
            }],
            ..Default::default()
        };

        let content = form.resolve(dir.path()).unwrap();
        assert_eq!(content.agenda, vec!["Intro", "Loops"]);
        assert_eq!(content.file_name(), "intro_to_python_presentation.pptx");
        assert_eq!(content.slides.len(), 1);
        // the third image is ignored, so its absence is not an error
        assert_eq!(content.slides[0].images.len(), 2);
        assert_eq!(content.slides[0].images[0].format, ImageFormat::Png);
        assert_eq!(content.slides[0].images[1].name.as_deref(), Some("b.png"));
    }

    #[test]
    fn test_resolve_ignores_extra_slides() {
        let mut form = DeckForm::blank();
        form.slides.push(ContentSlideForm {
            images: vec!["missing.png".into()],
            ..Default::default()
        });
        let content = form.resolve(".").unwrap();
        assert_eq!(content.slides.len(), CONTENT_SLIDE_COUNT);
    }

    #[test]
    fn test_resolve_missing_image() {
        let form = DeckForm {
            slides: vec![ContentSlideForm {
                images: vec!["nope.png".into()],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(matches!(form.resolve("/nonexistent"), Err(Error::Io(_))));
    }
}
