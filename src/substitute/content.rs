use crate::model::{Image, Slide, Traversal};
use log::{debug, warn};

/// Ordered placeholder → text mapping for a content slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Replacements {
    entries: Vec<(String, String)>,
}

impl Replacements {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a mapping.
    pub fn with(mut self, placeholder: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(placeholder, text);
        self
    }

    /// Add a mapping, or update it in place if the placeholder is known.
    pub fn insert(&mut self, placeholder: impl Into<String>, text: impl Into<String>) {
        let placeholder = placeholder.into();
        let text = text.into();
        match self.entries.iter_mut().find(|(p, _)| *p == placeholder) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((placeholder, text)),
        }
    }

    /// Mappings in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, t)| (p.as_str(), t.as_str()))
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no mappings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Text for a shape: of the placeholders contained in `text`, the last
    /// one in mapping order decides. Returns the placeholder and its text.
    pub fn resolve(&self, text: &str) -> Option<(&str, &str)> {
        let mut matched = self.iter().filter(|(p, _)| !p.is_empty() && text.contains(p));
        let first = matched.next()?;
        let mut last = first;
        let mut count = 1;
        for m in matched {
            last = m;
            count += 1;
        }
        if count > 1 {
            warn!(
                "{} placeholders in one shape ({:?}), using {}",
                count, text, last.0
            );
        }
        Some(last)
    }
}

impl<P: Into<String>, T: Into<String>> FromIterator<(P, T)> for Replacements {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut replacements = Self::new();
        for (p, t) in iter {
            replacements.insert(p, t);
        }
        replacements
    }
}

/// What [`fill_content_slide`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentFill {
    /// Text shapes rewritten
    pub text_replaced: usize,
    /// Pictures swapped for new images
    pub pictures_replaced: usize,
}

/// Fill a content slide.
///
/// Text shapes at the top level that contain a placeholder get their whole
/// text replaced. Then the top-level pictures, in list order, are swapped
/// for `images` one by one, each new picture taking the old one's bounds
/// and index. Pictures beyond the images provided stay as they are.
pub fn fill_content_slide(
    slide: &mut Slide,
    replacements: &Replacements,
    images: &[Image],
) -> ContentFill {
    let mut fill = ContentFill::default();

    slide
        .shapes_mut()
        .visit_mut(Traversal::TopLevel, &mut |shape| {
            let Some(frame) = shape.text_frame_mut() else {
                return;
            };
            if let Some((placeholder, text)) = replacements.resolve(&frame.text()) {
                debug!("Updating {} -> {:?}", placeholder, text);
                frame.set_text(text);
                fill.text_replaced += 1;
            }
        });

    let pictures = slide.shapes().picture_indices();
    for (n, (index, image)) in pictures.into_iter().zip(images).enumerate() {
        debug!(
            "Replacing Picture {} with {}",
            n + 1,
            image.name.as_deref().unwrap_or("image")
        );
        if let Some(placement) = slide.replace_picture(index, image.clone()) {
            debug!("Picture {} placed: {:?}", n + 1, placement);
            fill.pictures_replaced += 1;
        }
    }

    fill
}
