//! Shape tree models.
//!
//! Shapes are lifted out of `p:spTree` (and nested `p:grpSp`) into a
//! [`ShapeTree`]. Each shape keeps its own XML; only the parts the
//! substitutors edit (text bodies, picture references) are modelled.

use super::image::Image;
use super::text::TextFrame;
use crate::xml::{Element, Node};
use serde::{Deserialize, Serialize};

/// Relationship type of an embedded picture.
pub const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Position and size of a shape in EMU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Bounds {
    /// Create bounds from offset and extent.
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Read `a:off` / `a:ext` from an `a:xfrm` element.
    fn from_xfrm(xfrm: &Element) -> Option<Self> {
        let off = xfrm.child("off")?;
        let ext = xfrm.child("ext")?;
        let num = |el: &Element, key: &str| el.attr(key).and_then(|v| v.parse::<i64>().ok());
        Some(Self {
            left: num(off, "x")?,
            top: num(off, "y")?,
            width: num(ext, "cx")?,
            height: num(ext, "cy")?,
        })
    }
}

/// Whether a traversal descends into group shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Only the shapes of the collection itself
    TopLevel,
    /// Every non-group shape at any depth
    Recursive,
}

/// A shape on a slide.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Shape with a text body (`p:sp` + `p:txBody`)
    Text(TextShape),
    /// Picture (`p:pic`)
    Picture(PictureShape),
    /// Group of shapes (`p:grpSp`)
    Group(GroupShape),
    /// Anything else, kept verbatim
    Other(Element),
}

impl Shape {
    /// Classify a shape-tree element.
    pub fn from_element(element: Element) -> Self {
        match element.local_name() {
            "sp" => match TextShape::from_element(element) {
                Ok(shape) => Shape::Text(shape),
                Err(element) => Shape::Other(element),
            },
            "pic" => Shape::Picture(PictureShape::from_element(element)),
            "grpSp" => Shape::Group(GroupShape::from_element(element)),
            _ => Shape::Other(element),
        }
    }

    /// Reassemble the shape's XML.
    pub fn to_element(&self) -> Element {
        match self {
            Shape::Text(s) => s.to_element(),
            Shape::Picture(p) => p.element.clone(),
            Shape::Group(g) => g.to_element(),
            Shape::Other(e) => e.clone(),
        }
    }

    /// Non-visual container (`p:nvSpPr`, `p:nvPicPr`, `p:nvGrpSpPr`, ...).
    fn non_visual_container(&self) -> Option<&Element> {
        match self {
            Shape::Text(s) => non_visual_container(&s.element),
            Shape::Picture(p) => non_visual_container(&p.element),
            // lifted into the group's tree with the other container properties
            Shape::Group(g) => g.shapes.properties().iter().find(|e| is_non_visual(e)),
            Shape::Other(e) => non_visual_container(e),
        }
    }

    /// Non-visual properties element (`p:cNvPr`).
    fn non_visual(&self) -> Option<&Element> {
        self.non_visual_container().and_then(|nv| nv.child("cNvPr"))
    }

    /// Placeholder reference (`p:nvPr/p:ph`), for shapes that fill a slot
    /// of the slide layout.
    pub fn placeholder(&self) -> Option<PlaceholderRef> {
        self.non_visual_container()
            .and_then(|nv| nv.child("nvPr"))
            .and_then(PlaceholderRef::from_nv_pr)
    }

    /// Position and size from the shape's own `a:xfrm`.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Shape::Text(s) => own_bounds(&s.element),
            Shape::Picture(p) => p.bounds(),
            Shape::Group(g) => g
                .shapes
                .properties()
                .iter()
                .find(|e| e.local_name() == "grpSpPr")
                .and_then(|pr| pr.child("xfrm"))
                .and_then(Bounds::from_xfrm),
            Shape::Other(e) => own_bounds(e),
        }
    }

    /// Shape id from `p:cNvPr`.
    pub fn id(&self) -> Option<u32> {
        self.non_visual()
            .and_then(|nv| nv.attr("id"))
            .and_then(|id| id.parse().ok())
    }

    /// Shape name from `p:cNvPr`.
    pub fn name(&self) -> Option<&str> {
        self.non_visual().and_then(|nv| nv.attr("name"))
    }

    /// Whether the shape owns a text frame.
    pub fn has_text_frame(&self) -> bool {
        matches!(self, Shape::Text(_))
    }

    /// Text frame, if the shape owns one.
    pub fn text_frame(&self) -> Option<&TextFrame> {
        match self {
            Shape::Text(s) => Some(&s.text_frame),
            _ => None,
        }
    }

    /// Mutable text frame, if the shape owns one.
    pub fn text_frame_mut(&mut self) -> Option<&mut TextFrame> {
        match self {
            Shape::Text(s) => Some(&mut s.text_frame),
            _ => None,
        }
    }

    /// Full text of the shape's text frame.
    pub fn text(&self) -> Option<String> {
        self.text_frame().map(TextFrame::text)
    }

    /// Picture view, if this is a picture.
    pub fn as_picture(&self) -> Option<&PictureShape> {
        match self {
            Shape::Picture(p) => Some(p),
            _ => None,
        }
    }

    /// Largest `cNvPr` id in this shape and its descendants.
    fn max_id(&self) -> u32 {
        match self {
            Shape::Text(s) => max_id_in(&s.element),
            Shape::Picture(p) => max_id_in(&p.element),
            Shape::Group(g) => max_id_in(&g.element).max(g.shapes.max_id()),
            Shape::Other(e) => max_id_in(e),
        }
    }
}

fn is_non_visual(element: &Element) -> bool {
    element.local_name().starts_with("nv")
}

fn non_visual_container(element: &Element) -> Option<&Element> {
    element.elements().find(|e| is_non_visual(e))
}

fn own_bounds(element: &Element) -> Option<Bounds> {
    element
        .find_path(&["spPr", "xfrm"])
        .and_then(Bounds::from_xfrm)
}

/// A `p:ph` reference tying a shape to a slot of its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRef {
    /// `type` attribute (`pic`, `body`, `title`, ...); absent means an
    /// object placeholder
    pub kind: Option<String>,
    /// `idx` attribute, 0 when absent
    pub idx: u32,
}

impl PlaceholderRef {
    fn from_nv_pr(nv_pr: &Element) -> Option<Self> {
        let ph = nv_pr.child("ph")?;
        Some(Self {
            kind: ph.attr("type").map(str::to_string),
            idx: ph.attr("idx").and_then(|v| v.parse().ok()).unwrap_or(0),
        })
    }
}

fn max_id_in(element: &Element) -> u32 {
    let mut max = 0;
    element.walk(&mut |e| {
        if e.local_name() == "cNvPr" {
            if let Some(id) = e.attr("id").and_then(|v| v.parse::<u32>().ok()) {
                max = max.max(id);
            }
        }
    });
    max
}

/// A shape with a text body.
#[derive(Debug, Clone, PartialEq)]
pub struct TextShape {
    /// The `p:sp` element without its `p:txBody`
    element: Element,
    /// Child index the body is re-inserted at
    body_index: usize,
    text_frame: TextFrame,
}

impl TextShape {
    /// Split the text body out of a `p:sp`; shapes without one are handed back.
    fn from_element(mut element: Element) -> std::result::Result<Self, Element> {
        element.children.retain(|n| !n.is_whitespace());
        let Some(body_index) = element
            .children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if e.local_name() == "txBody"))
        else {
            return Err(element);
        };
        let Node::Element(body) = element.children.remove(body_index) else {
            return Err(element);
        };
        Ok(Self {
            element,
            body_index,
            text_frame: TextFrame::from_element(body),
        })
    }

    fn to_element(&self) -> Element {
        let mut element = self.element.clone();
        let index = self.body_index.min(element.children.len());
        element
            .children
            .insert(index, Node::Element(self.text_frame.to_element()));
        element
    }

    /// Text frame of the shape.
    pub fn text_frame(&self) -> &TextFrame {
        &self.text_frame
    }

    /// Mutable text frame of the shape.
    pub fn text_frame_mut(&mut self) -> &mut TextFrame {
        &mut self.text_frame
    }

    /// Replace the entire text of the shape.
    pub fn set_text(&mut self, text: &str) {
        self.text_frame.set_text(text);
    }
}

/// Where a picture's image data comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PictureSource {
    /// Embedded through a slide relationship
    Embedded(String),
    /// Inserted in memory, embedded when the presentation is saved
    Pending(Image),
    /// Linked or missing image reference
    Unresolved,
}

/// A picture shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PictureShape {
    element: Element,
    source: PictureSource,
}

impl PictureShape {
    /// Build a new picture at the given bounds. Without bounds the picture
    /// carries no transform of its own. The image is embedded when the
    /// owning presentation is saved.
    pub fn new(id: u32, name: &str, bounds: Option<Bounds>, image: Image) -> Self {
        let descr = image.name.clone().unwrap_or_default();
        let mut sp_pr = Element::new("p:spPr");
        if let Some(bounds) = bounds {
            sp_pr = sp_pr.with_child(
                Element::new("a:xfrm")
                    .with_child(
                        Element::new("a:off")
                            .with_attr("x", bounds.left.to_string())
                            .with_attr("y", bounds.top.to_string()),
                    )
                    .with_child(
                        Element::new("a:ext")
                            .with_attr("cx", bounds.width.to_string())
                            .with_attr("cy", bounds.height.to_string()),
                    ),
            );
        }
        let sp_pr = sp_pr.with_child(
            Element::new("a:prstGeom")
                .with_attr("prst", "rect")
                .with_child(Element::new("a:avLst")),
        );
        let element = Element::new("p:pic")
            .with_child(
                Element::new("p:nvPicPr")
                    .with_child(
                        Element::new("p:cNvPr")
                            .with_attr("id", id.to_string())
                            .with_attr("name", name)
                            .with_attr("descr", descr),
                    )
                    .with_child(
                        Element::new("p:cNvPicPr")
                            .with_child(Element::new("a:picLocks").with_attr("noChangeAspect", "1")),
                    )
                    .with_child(Element::new("p:nvPr")),
            )
            .with_child(
                Element::new("p:blipFill")
                    .with_child(Element::new("a:blip").with_attr("r:embed", ""))
                    .with_child(Element::new("a:stretch").with_child(Element::new("a:fillRect"))),
            )
            .with_child(sp_pr);

        Self {
            element,
            source: PictureSource::Pending(image),
        }
    }

    fn from_element(mut element: Element) -> Self {
        element.children.retain(|n| !n.is_whitespace());
        let source = element
            .find_path(&["blipFill", "blip"])
            .and_then(|blip| blip.attr_local("embed"))
            .filter(|id| !id.is_empty())
            .map(|id| PictureSource::Embedded(id.to_string()))
            .unwrap_or(PictureSource::Unresolved);
        Self { element, source }
    }

    /// Position and size, when the picture carries its own transform.
    pub fn bounds(&self) -> Option<Bounds> {
        own_bounds(&self.element)
    }

    /// Application properties (`p:nvPr`), which hold the placeholder link.
    pub(crate) fn app_properties(&self) -> Option<&Element> {
        self.element.find_path(&["nvPicPr", "nvPr"])
    }

    /// Replace the application properties with `nv_pr`.
    pub(crate) fn set_app_properties(&mut self, nv_pr: Element) {
        if let Some(current) = self.element.find_path_mut(&["nvPicPr", "nvPr"]) {
            *current = nv_pr;
        }
    }

    /// Image source.
    pub fn source(&self) -> &PictureSource {
        &self.source
    }

    /// Relationship id of the embedded image.
    pub fn embed_id(&self) -> Option<&str> {
        match &self.source {
            PictureSource::Embedded(id) => Some(id),
            _ => None,
        }
    }

    /// Take the in-memory image out, leaving the picture unresolved until
    /// [`PictureShape::set_embed_id`] is called.
    pub(crate) fn take_pending(&mut self) -> Option<Image> {
        match std::mem::replace(&mut self.source, PictureSource::Unresolved) {
            PictureSource::Pending(image) => Some(image),
            other => {
                self.source = other;
                None
            }
        }
    }

    /// Point the picture at an image relationship.
    pub(crate) fn set_embed_id(&mut self, rel_id: &str) {
        if let Some(blip) = self.element.find_path_mut(&["blipFill", "blip"]) {
            blip.attributes.retain(|(k, _)| crate::xml::local_name(k) != "embed");
            blip.set_attr("r:embed", rel_id);
        }
        self.source = PictureSource::Embedded(rel_id.to_string());
    }
}

/// A group shape and its children.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupShape {
    /// The `p:grpSp` element without children
    element: Element,
    shapes: ShapeTree,
}

impl GroupShape {
    fn from_element(mut element: Element) -> Self {
        let shapes = ShapeTree::from_children(std::mem::take(&mut element.children));
        Self { element, shapes }
    }

    fn to_element(&self) -> Element {
        let mut element = self.element.clone();
        element.children = self.shapes.to_children();
        element
    }

    /// Child shapes.
    pub fn shapes(&self) -> &ShapeTree {
        &self.shapes
    }

    /// Mutable child shapes.
    pub fn shapes_mut(&mut self) -> &mut ShapeTree {
        &mut self.shapes
    }
}

/// Ordered shapes of a `p:spTree` or `p:grpSp`, plus the container's own
/// property elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeTree {
    /// `nvGrpSpPr` / `grpSpPr`
    head: Vec<Element>,
    shapes: Vec<Shape>,
    /// `extLst`
    tail: Vec<Element>,
}

impl ShapeTree {
    /// Split container children into properties and shapes.
    pub fn from_children(children: Vec<Node>) -> Self {
        let mut tree = Self::default();
        for node in children {
            let Node::Element(element) = node else {
                continue;
            };
            match element.local_name() {
                "nvGrpSpPr" | "grpSpPr" => tree.head.push(element),
                "extLst" => tree.tail.push(element),
                _ => tree.shapes.push(Shape::from_element(element)),
            }
        }
        tree
    }

    /// Reassemble container children.
    pub fn to_children(&self) -> Vec<Node> {
        self.head
            .iter()
            .cloned()
            .chain(self.shapes.iter().map(Shape::to_element))
            .chain(self.tail.iter().cloned())
            .map(Node::Element)
            .collect()
    }

    /// Container property elements (`nvGrpSpPr`, `grpSpPr`).
    pub(crate) fn properties(&self) -> &[Element] {
        &self.head
    }

    /// Shapes in list order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Number of shapes at this level.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether there are no shapes at this level.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Shape at `index`.
    pub fn get(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    /// Mutable shape at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Shape> {
        self.shapes.get_mut(index)
    }

    /// Append a shape on top of the z-order.
    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Insert a shape at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, shape: Shape) {
        let index = index.min(self.shapes.len());
        self.shapes.insert(index, shape);
    }

    /// Remove the shape at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Shape> {
        (index < self.shapes.len()).then(|| self.shapes.remove(index))
    }

    /// Indices of the top-level pictures, in list order.
    pub fn picture_indices(&self) -> Vec<usize> {
        self.shapes
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, Shape::Picture(_)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Visit shapes in list order.
    ///
    /// With [`Traversal::Recursive`] groups are replaced by their children
    /// (depth first); with [`Traversal::TopLevel`] groups are visited as
    /// shapes themselves.
    pub fn visit<F: FnMut(&Shape)>(&self, traversal: Traversal, f: &mut F) {
        for shape in &self.shapes {
            match shape {
                Shape::Group(group) if traversal == Traversal::Recursive => {
                    group.shapes.visit(traversal, f)
                }
                _ => f(shape),
            }
        }
    }

    /// Mutable variant of [`ShapeTree::visit`].
    pub fn visit_mut<F: FnMut(&mut Shape)>(&mut self, traversal: Traversal, f: &mut F) {
        for shape in &mut self.shapes {
            match shape {
                Shape::Group(group) if traversal == Traversal::Recursive => {
                    group.shapes.visit_mut(traversal, f)
                }
                _ => f(shape),
            }
        }
    }

    /// Largest shape id used anywhere in the tree.
    pub fn max_id(&self) -> u32 {
        let head = self.head.iter().map(max_id_in).max().unwrap_or(0);
        self.shapes.iter().map(Shape::max_id).fold(head, u32::max)
    }
}
