//! PPTX presentation loading and saving.

use crate::container::{OoxmlContainer, Relationships};
use crate::detect;
use crate::error::{Error, Result};
use crate::model::{
    layout_slots, Bounds, PlaceholderRef, Shape, Slide, SlideSummary, Traversal, IMAGE_REL_TYPE,
};
use crate::xml::{local_name, Element, Node, XmlDocument};
use log::debug;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const MEDIA_DIR: &str = "ppt/media/";
const LAYOUT_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

/// A presentation package with its slides parsed in presentation order.
pub struct Presentation {
    container: OoxmlContainer,
    slides: Vec<Slide>,
    /// Media parts embedded since loading
    media: BTreeMap<String, Vec<u8>>,
    /// `(extension, content type)` pairs those parts need
    media_types: Vec<(&'static str, &'static str)>,
}

impl Presentation {
    /// Open a presentation file.
    ///
    /// A path that does not exist is reported as
    /// [`Error::TemplateNotFound`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::TemplateNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        Self::from_bytes(data)
    }

    /// Load a presentation from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        detect::ensure_presentation(&data)?;
        let container = OoxmlContainer::from_bytes(data)?;
        let slides = Self::load_slides(&container)?;
        debug!("Loaded presentation with {} slides", slides.len());
        Ok(Self {
            container,
            slides,
            media: BTreeMap::new(),
            media_types: Vec::new(),
        })
    }

    /// Parse slides in `sldIdLst` order.
    fn load_slides(container: &OoxmlContainer) -> Result<Vec<Slide>> {
        let rels = container.read_relationships(PRESENTATION_PART)?;
        let xml = container.read_xml(PRESENTATION_PART)?;
        let doc = XmlDocument::parse(&xml)?;

        let Some(list) = doc.root.child("sldIdLst") else {
            return Ok(Vec::new());
        };

        let mut slides = Vec::new();
        for entry in list.elements().filter(|e| e.local_name() == "sldId") {
            // r:id, not the numeric id
            let rel_id = entry
                .attributes
                .iter()
                .find(|(k, _)| k.contains(':') && local_name(k) == "id")
                .map(|(_, v)| v.as_str())
                .ok_or_else(|| Error::InvalidData("p:sldId without r:id".to_string()))?;
            let rel = rels.get(rel_id).ok_or_else(|| {
                Error::MissingComponent(format!("slide relationship {}", rel_id))
            })?;

            let part_name = OoxmlContainer::resolve_path(PRESENTATION_PART, &rel.target);
            let slide_xml = container.read_xml(&part_name)?;
            let slide_rels = container.read_relationships(&part_name)?;
            let layout = Self::load_layout_slots(container, &part_name, &slide_rels)?;

            let mut slide = Slide::parse(part_name, &slide_xml, slide_rels)?;
            slide.set_layout_slots(layout);
            slides.push(slide);
        }
        Ok(slides)
    }

    /// Placeholder geometry of the layout a slide is based on. A missing
    /// layout part leaves the slide without inherited geometry.
    fn load_layout_slots(
        container: &OoxmlContainer,
        slide_part: &str,
        slide_rels: &Relationships,
    ) -> Result<Vec<(PlaceholderRef, Bounds)>> {
        let Some(rel) = slide_rels.get_by_type(LAYOUT_REL_TYPE).into_iter().next() else {
            return Ok(Vec::new());
        };
        let layout_part = OoxmlContainer::resolve_path(slide_part, &rel.target);
        if !container.exists(&layout_part) {
            debug!("{}: layout {} not in package", slide_part, layout_part);
            return Ok(Vec::new());
        }
        layout_slots(&container.read_xml(&layout_part)?)
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Mutable slides in presentation order.
    pub fn slides_mut(&mut self) -> &mut [Slide] {
        &mut self.slides
    }

    /// Slide at a 0-based index.
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// Mutable slide at a 0-based index.
    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Per-slide overview.
    pub fn summary(&self) -> Vec<SlideSummary> {
        self.slides
            .iter()
            .enumerate()
            .map(|(i, s)| s.summary(i))
            .collect()
    }

    /// Serialize the package.
    ///
    /// Pictures inserted since loading are embedded as new media parts and
    /// stay embedded afterwards, so saving twice yields the same package.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.embed_pending_images()?;

        let mut parts = self.media.clone();
        for slide in &self.slides {
            if !slide.relationships().is_empty() {
                parts.insert(
                    OoxmlContainer::relationships_path(slide.part_name()),
                    slide.relationships().to_xml().into_bytes(),
                );
            }
            parts.insert(slide.part_name().to_string(), slide.to_xml().into_bytes());
        }

        if !self.media_types.is_empty() {
            let xml = self.container.read_xml(CONTENT_TYPES_PART)?;
            let updated = add_default_content_types(&xml, &self.media_types)?;
            parts.insert(CONTENT_TYPES_PART.to_string(), updated.into_bytes());
        }

        let cursor = self.container.write_to(Cursor::new(Vec::new()), &parts)?;
        Ok(cursor.into_inner())
    }

    /// Give every pending picture a media part and a slide relationship.
    fn embed_pending_images(&mut self) -> Result<()> {
        let mut next_media = self.next_media_number();
        let media = &mut self.media;
        let media_types = &mut self.media_types;

        for slide in &mut self.slides {
            let part_name = slide.part_name().to_string();
            let mut pending_error = None;

            let (shapes, rels) = slide.parts_mut();
            shapes.visit_mut(Traversal::Recursive, &mut |shape| {
                let Shape::Picture(picture) = shape else {
                    return;
                };
                let Some(image) = picture.take_pending() else {
                    return;
                };
                if image.is_empty() {
                    pending_error.get_or_insert_with(|| {
                        Error::UnsupportedImage(format!(
                            "{}: empty image data",
                            image.name.as_deref().unwrap_or("picture")
                        ))
                    });
                    return;
                }

                let ext = image.format.extension();
                let media_part = format!("{}image{}.{}", MEDIA_DIR, next_media, ext);
                next_media += 1;

                let target = OoxmlContainer::relative_path(&part_name, &media_part);
                let rel_id = rels.add_new(IMAGE_REL_TYPE, &target);
                picture.set_embed_id(&rel_id);
                debug!("Embedding {} as {} ({})", media_part, rel_id, part_name);

                if !media_types.iter().any(|(e, _)| *e == ext) {
                    media_types.push((ext, image.format.content_type()));
                }
                media.insert(media_part, image.data);
            });

            if let Some(err) = pending_error {
                return Err(err);
            }
        }
        Ok(())
    }

    /// Serialize the package to a file.
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// First free `ppt/media/imageN` number.
    fn next_media_number(&self) -> u32 {
        self.container
            .list_files_with_prefix(MEDIA_DIR)
            .iter()
            .chain(self.media.keys())
            .filter_map(|name| {
                let file = name.strip_prefix(MEDIA_DIR)?.strip_prefix("image")?;
                let (number, _) = file.split_once('.')?;
                number.parse::<u32>().ok()
            })
            .max()
            .map_or(1, |n| n + 1)
    }
}

impl std::fmt::Debug for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("container", &self.container)
            .field("slides", &self.slides.len())
            .finish()
    }
}

/// Register `Default` content types for extensions the package lacks.
fn add_default_content_types(xml: &str, extensions: &[(&str, &str)]) -> Result<String> {
    let mut doc = XmlDocument::parse(xml)?;
    let root = &mut doc.root;

    for (ext, content_type) in extensions {
        let known = root.elements().any(|e| {
            e.local_name() == "Default"
                && e.attr("Extension").is_some_and(|x| x.eq_ignore_ascii_case(ext))
        });
        if known {
            continue;
        }

        // Defaults go before the Overrides
        let position = root
            .children
            .iter()
            .rposition(|n| n.as_element().is_some_and(|e| e.local_name() == "Default"))
            .map_or(0, |i| i + 1);
        let default = Element::new(root.qualify("Default"))
            .with_attr("Extension", *ext)
            .with_attr("ContentType", *content_type);
        root.children.insert(position, Node::Element(default));
    }

    Ok(doc.to_xml())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="PNG" ContentType="image/png"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/></Types>"#;

    #[test]
    fn test_add_default_content_types() {
        let xml = add_default_content_types(
            CONTENT_TYPES,
            &[("png", "image/png"), ("jpeg", "image/jpeg")],
        )
        .unwrap();

        assert_eq!(xml.matches("Extension=\"PNG\"").count(), 1);
        assert!(!xml.contains("Extension=\"png\""));

        let jpeg = xml.find("Extension=\"jpeg\"").unwrap();
        let first_override = xml.find("<Override").unwrap();
        assert!(jpeg < first_override);
    }

    #[test]
    fn test_rejects_non_presentation() {
        let err = Presentation::from_bytes(b"not a zip".to_vec()).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
    }

    #[test]
    fn test_open_missing_file() {
        let err = Presentation::open("does/not/exist.pptx").unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(p) if p.ends_with("exist.pptx")));
    }
}
