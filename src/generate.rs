//! Deck generation from the fixed template.
//!
//! The template has 16 slides: a cover slide with `[TOPIC]` and
//! `[SUBTOPICS]`, an agenda slide of `[TITLE-i]` labels, 13 content slides
//! and a summary slide of `[TITLE-i]` labels.

use crate::error::{Error, Result};
use crate::model::Image;
use crate::pptx::Presentation;
use crate::substitute::{self, Replacements, TitleLabels};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// MIME type of the generated document.
pub const PPTX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Default template location, relative to the working directory.
pub const DEFAULT_TEMPLATE: &str = "Template.pptx";

/// Slides in the template.
pub const EXPECTED_SLIDE_COUNT: usize = 16;

/// Content slides, from the third slide on.
pub const CONTENT_SLIDE_COUNT: usize = 13;

/// Pictures replaced per content slide.
pub const MAX_IMAGES_PER_SLIDE: usize = 2;

pub const TOPIC_MARKER: &str = "[TOPIC]";
pub const SUBTOPICS_MARKER: &str = "[SUBTOPICS]";
pub const SUBTOPIC_MARKER: &str = "[SUBTOPIC]";
pub const SUBTOPIC_EXPLAINS_MARKER: &str = "[SUBTOPIC EXPLAINS]";
pub const SYNTAX_MARKER: &str = "[SYNTAX]";
pub const EXPLAIN_MARKER: &str = "[EXPLAIN]";

const COVER_SLIDE: usize = 0;
const AGENDA_SLIDE: usize = 1;
const FIRST_CONTENT_SLIDE: usize = 2;
const SUMMARY_SLIDE: usize = FIRST_CONTENT_SLIDE + CONTENT_SLIDE_COUNT;

/// Text and images for one content slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentSlide {
    pub topic: String,
    pub syntax: String,
    pub explanation: String,
    /// Pictures in slide order: implementation, then output
    pub images: Vec<Image>,
}

impl ContentSlide {
    /// Placeholder mapping for this slide.
    pub fn replacements(&self) -> Replacements {
        Replacements::new()
            .with(SUBTOPIC_MARKER, self.topic.as_str())
            .with(SUBTOPIC_EXPLAINS_MARKER, format!("{}Explained", self.topic))
            .with(SYNTAX_MARKER, self.syntax.as_str())
            .with(EXPLAIN_MARKER, self.explanation.as_str())
    }
}

/// Everything substituted into the template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckContent {
    pub title: String,
    /// Inserted verbatim for `[SUBTOPICS]`
    pub subtopics: String,
    /// Agenda slide items, `[TITLE-1]` first
    pub agenda: Vec<String>,
    /// Up to 13 content slides; missing ones are filled blank
    pub slides: Vec<ContentSlide>,
    /// Summary slide items, `[TITLE-1]` first
    pub summary: Vec<String>,
}

impl DeckContent {
    /// Download name for the generated deck.
    pub fn file_name(&self) -> String {
        file_name_for(&self.title)
    }
}

/// `"Intro to Python"` → `intro_to_python_presentation.pptx`
///
/// Path separators become `_` as well, so the name is always a single
/// path component.
pub fn file_name_for(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    format!("{}_presentation.pptx", stem.to_lowercase())
}

/// Options for [`Generator`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Template to fill
    pub template_path: PathBuf,

    /// Slides the template must have
    pub expected_slide_count: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from(DEFAULT_TEMPLATE),
            expected_slide_count: EXPECTED_SLIDE_COUNT,
        }
    }
}

impl GenerateOptions {
    /// Create new generate options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the template path.
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = path.into();
        self
    }

    /// Set the slide count the template must have.
    pub fn with_expected_slide_count(mut self, count: usize) -> Self {
        self.expected_slide_count = count;
        self
    }
}

/// A generated document ready for download.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDeck {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl GeneratedDeck {
    /// Write the deck into `dir` under its file name and return the path.
    pub fn save_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Fills the template with deck content.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GenerateOptions,
}

impl Generator {
    /// Create a generator.
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Load the template and fill it.
    pub fn generate(&self, content: &DeckContent) -> Result<GeneratedDeck> {
        let presentation = Presentation::open(&self.options.template_path)?;
        self.generate_from(presentation, content)
    }

    /// Fill an already loaded template.
    pub fn generate_from(
        &self,
        mut presentation: Presentation,
        content: &DeckContent,
    ) -> Result<GeneratedDeck> {
        self.fill(&mut presentation, content)?;
        let bytes = presentation.to_bytes()?;

        let deck = GeneratedDeck {
            file_name: content.file_name(),
            mime_type: PPTX_MIME_TYPE,
            bytes,
        };
        info!("Generated {} ({} bytes)", deck.file_name, deck.bytes.len());
        Ok(deck)
    }

    /// Apply every substitution pass. The slide count is checked first, so
    /// a mismatched template is left untouched.
    pub fn fill(&self, presentation: &mut Presentation, content: &DeckContent) -> Result<()> {
        let found = presentation.slide_count();
        if found != self.options.expected_slide_count {
            return Err(Error::SlideCountMismatch {
                expected: self.options.expected_slide_count,
                found,
            });
        }
        if found < SUMMARY_SLIDE + 1 {
            return Err(Error::InvalidData(format!(
                "the deck layout needs {} slides, the template has {}",
                SUMMARY_SLIDE + 1,
                found
            )));
        }
        if content.slides.len() > CONTENT_SLIDE_COUNT {
            warn!(
                "Ignoring {} content slides beyond the first {}",
                content.slides.len() - CONTENT_SLIDE_COUNT,
                CONTENT_SLIDE_COUNT
            );
        }

        let slides = presentation.slides_mut();

        let cover = slides[COVER_SLIDE].shapes_mut();
        substitute::replace_in_runs(cover, TOPIC_MARKER, &content.title);
        substitute::replace_in_runs(cover, SUBTOPICS_MARKER, &content.subtopics);

        let agenda = TitleLabels::new(content.agenda.iter().map(String::as_str));
        let n = substitute::replace_titles(slides[AGENDA_SLIDE].shapes_mut(), &agenda);
        debug!("Agenda: {} of {} titles placed", n, agenda.len());

        let blank = ContentSlide::default();
        for i in 0..CONTENT_SLIDE_COUNT {
            let data = content.slides.get(i).unwrap_or(&blank);
            let images = if data.images.len() > MAX_IMAGES_PER_SLIDE {
                warn!(
                    "Slide {}: ignoring {} images beyond the first {}",
                    FIRST_CONTENT_SLIDE + i + 1,
                    data.images.len() - MAX_IMAGES_PER_SLIDE,
                    MAX_IMAGES_PER_SLIDE
                );
                &data.images[..MAX_IMAGES_PER_SLIDE]
            } else {
                &data.images[..]
            };

            let slide = &mut slides[FIRST_CONTENT_SLIDE + i];
            let fill = substitute::fill_content_slide(slide, &data.replacements(), images);
            debug!(
                "Slide {}: {} text shapes, {} pictures replaced",
                FIRST_CONTENT_SLIDE + i + 1,
                fill.text_replaced,
                fill.pictures_replaced
            );
        }

        let summary = TitleLabels::new(content.summary.iter().map(String::as_str));
        let n = substitute::replace_titles(slides[SUMMARY_SLIDE].shapes_mut(), &summary);
        debug!("Summary: {} of {} titles placed", n, summary.len());

        Ok(())
    }
}
