//! Slide model.

use super::image::Image;
use super::shape::{Bounds, PictureShape, PlaceholderRef, Shape, ShapeTree, Traversal};
use crate::container::Relationships;
use crate::error::{Error, Result};
use crate::xml::XmlDocument;
use log::warn;
use serde::Serialize;

const SHAPE_TREE_PATH: [&str; 2] = ["cSld", "spTree"];

/// Namespaces new pictures rely on.
const REQUIRED_NAMESPACES: [(&str, &str); 3] = [
    (
        "xmlns:a",
        "http://schemas.openxmlformats.org/drawingml/2006/main",
    ),
    (
        "xmlns:r",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
    ),
    (
        "xmlns:p",
        "http://schemas.openxmlformats.org/presentationml/2006/main",
    ),
];

/// Where a replacement picture was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The old picture's own transform
    Explicit(Bounds),
    /// Geometry of the matching slot on the slide layout
    Layout(Bounds),
    /// No geometry found; the picture keeps the placeholder link and
    /// inherits its placement
    Inherited,
}

impl Placement {
    /// Bounds written onto the new picture, if any.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Placement::Explicit(b) | Placement::Layout(b) => Some(*b),
            Placement::Inherited => None,
        }
    }
}

/// A slide part with its shape tree lifted out.
#[derive(Debug, Clone)]
pub struct Slide {
    part_name: String,
    /// Slide XML with an empty `p:spTree`
    document: XmlDocument,
    shapes: ShapeTree,
    relationships: Relationships,
    /// Placeholder slots of the slide layout that carry geometry
    layout_slots: Vec<(PlaceholderRef, Bounds)>,
}

impl Slide {
    /// Parse slide XML.
    pub fn parse(
        part_name: impl Into<String>,
        xml: &str,
        relationships: Relationships,
    ) -> Result<Self> {
        let part_name = part_name.into();
        let mut document = XmlDocument::parse(xml)?;
        let tree = document
            .root
            .find_path_mut(&SHAPE_TREE_PATH)
            .ok_or_else(|| Error::MissingComponent(format!("{}: p:spTree", part_name)))?;
        let shapes = ShapeTree::from_children(std::mem::take(&mut tree.children));

        Ok(Self {
            part_name,
            document,
            shapes,
            relationships,
            layout_slots: Vec::new(),
        })
    }

    /// Attach the placeholder geometry of the slide's layout.
    pub fn set_layout_slots(&mut self, slots: Vec<(PlaceholderRef, Bounds)>) {
        self.layout_slots = slots;
    }

    /// Geometry a placeholder inherits from the layout: the slot with the
    /// same `idx`, else the first slot of the same type.
    pub fn inherited_bounds(&self, placeholder: &PlaceholderRef) -> Option<Bounds> {
        self.layout_slots
            .iter()
            .find(|(slot, _)| slot.idx == placeholder.idx)
            .or_else(|| {
                placeholder.kind.as_ref().and_then(|kind| {
                    self.layout_slots
                        .iter()
                        .find(|(slot, _)| slot.kind.as_ref() == Some(kind))
                })
            })
            .map(|(_, bounds)| *bounds)
    }

    /// Package part name (e.g. `ppt/slides/slide3.xml`).
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    /// Top-level shapes.
    pub fn shapes(&self) -> &ShapeTree {
        &self.shapes
    }

    /// Mutable top-level shapes.
    pub fn shapes_mut(&mut self) -> &mut ShapeTree {
        &mut self.shapes
    }

    /// Slide relationships.
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Shape tree and relationships borrowed together, for embedding images.
    pub(crate) fn parts_mut(&mut self) -> (&mut ShapeTree, &mut Relationships) {
        (&mut self.shapes, &mut self.relationships)
    }

    /// Next free shape id.
    pub fn next_shape_id(&self) -> u32 {
        self.shapes.max_id() + 1
    }

    /// Append a picture on top of the slide.
    pub fn add_picture(&mut self, image: Image, bounds: Bounds) -> usize {
        let picture = self.new_picture(image, Some(bounds));
        self.shapes.push(Shape::Picture(picture));
        self.shapes.len() - 1
    }

    /// Remove the top-level shape at `index`.
    pub fn remove_shape(&mut self, index: usize) -> Option<Shape> {
        self.shapes.remove(index)
    }

    /// Swap the picture at `index` for `image`, keeping its place in the
    /// z-order and its placeholder link.
    ///
    /// The new picture takes the old one's transform, or, for a placeholder
    /// without one, the geometry of its layout slot. Returns `None` when
    /// `index` is not a picture.
    pub fn replace_picture(&mut self, index: usize, image: Image) -> Option<Placement> {
        let shape = self.shapes.get(index)?;
        let old = shape.as_picture()?;
        let app_properties = old.app_properties().cloned();

        let placement = match old.bounds() {
            Some(bounds) => Placement::Explicit(bounds),
            None => match shape.placeholder().and_then(|ph| self.inherited_bounds(&ph)) {
                Some(bounds) => Placement::Layout(bounds),
                None => {
                    warn!(
                        "{}: picture {:?} has no transform and no layout slot",
                        self.part_name,
                        shape.name()
                    );
                    Placement::Inherited
                }
            },
        };

        let mut picture = self.new_picture(image, placement.bounds());
        if let Some(nv_pr) = app_properties {
            picture.set_app_properties(nv_pr);
        }
        self.remove_shape(index);
        self.shapes.insert(index, Shape::Picture(picture));
        Some(placement)
    }

    fn new_picture(&self, image: Image, bounds: Option<Bounds>) -> PictureShape {
        let id = self.next_shape_id();
        PictureShape::new(id, &format!("Picture {}", id - 1), bounds, image)
    }

    /// Bracketed markers (`[...]`) found in any text on the slide.
    pub fn placeholders(&self) -> Vec<String> {
        let mut found = Vec::new();
        self.shapes.visit(Traversal::Recursive, &mut |shape| {
            if let Some(text) = shape.text() {
                for marker in bracket_markers(&text) {
                    if !found.iter().any(|m| m == marker) {
                        found.push(marker.to_string());
                    }
                }
            }
        });
        found
    }

    /// Short description used by `inspect`.
    pub fn summary(&self, index: usize) -> SlideSummary {
        let mut pictures = Vec::new();
        self.shapes.visit(Traversal::Recursive, &mut |shape| {
            if shape.as_picture().is_some() {
                let bounds = shape
                    .bounds()
                    .or_else(|| shape.placeholder().and_then(|ph| self.inherited_bounds(&ph)));
                pictures.push(bounds.unwrap_or_default());
            }
        });
        SlideSummary {
            number: index + 1,
            part_name: self.part_name.clone(),
            shapes: self.shapes.len(),
            placeholders: self.placeholders(),
            pictures,
        }
    }

    /// Serialize the slide part.
    pub fn to_xml(&self) -> String {
        let mut document = self.document.clone();
        for (key, value) in REQUIRED_NAMESPACES {
            if document.root.attr(key).is_none() {
                document.root.set_attr(key, value);
            }
        }
        if let Some(tree) = document.root.find_path_mut(&SHAPE_TREE_PATH) {
            tree.children = self.shapes.to_children();
        }
        document.to_xml()
    }
}

/// Placeholder slots with geometry on a slide layout part, groups
/// included.
pub fn layout_slots(xml: &str) -> Result<Vec<(PlaceholderRef, Bounds)>> {
    let document = XmlDocument::parse(xml)?;
    let Some(tree) = document.root.find_path(&SHAPE_TREE_PATH) else {
        return Ok(Vec::new());
    };
    let shapes = ShapeTree::from_children(tree.children.clone());

    let mut slots = Vec::new();
    shapes.visit(Traversal::Recursive, &mut |shape| {
        if let (Some(ph), Some(bounds)) = (shape.placeholder(), shape.bounds()) {
            slots.push((ph, bounds));
        }
    });
    Ok(slots)
}

/// Slide overview for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct SlideSummary {
    /// 1-based slide number
    pub number: usize,
    pub part_name: String,
    /// Top-level shape count
    pub shapes: usize,
    pub placeholders: Vec<String>,
    /// Bounds of every picture, groups included
    pub pictures: Vec<Bounds>,
}

fn bracket_markers(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices('[').filter_map(move |(start, _)| {
        let rest = &text[start..];
        let end = rest.find(']')?;
        let marker = &rest[..=end];
        (!marker[1..].contains('[')).then_some(marker)
    })
}
