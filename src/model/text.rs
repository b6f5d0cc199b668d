//! Text frame, paragraph and run models.
//!
//! A text frame wraps a `p:txBody`. Paragraphs keep their inline elements
//! (`a:pPr`, `a:br`, `a:fld`, `a:endParaRPr`) verbatim; only the text of
//! `a:r` runs is lifted out so it can be edited.

use crate::xml::{sanitize_text, Element, Node};

/// Character used for a soft line break (`a:br`) inside a paragraph.
pub const LINE_BREAK: char = '\u{b}';

/// A contiguous span of text sharing one formatting (`a:r`).
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// The `a:r` element with every child except `a:t`
    element: Element,
    text: String,
}

impl Run {
    /// Create a run with optional run properties.
    pub fn new(prefix: &str, properties: Option<Element>, text: impl Into<String>) -> Self {
        let mut element = Element::new(format!("{}:r", prefix));
        if let Some(props) = properties {
            element.children.push(Node::Element(props));
        }
        Self {
            element,
            text: sanitize_text(&text.into()),
        }
    }

    /// Text of the run.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text, leaving formatting alone.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = sanitize_text(&text.into());
    }

    /// Run properties (`a:rPr`), if present.
    pub fn properties(&self) -> Option<&Element> {
        self.element.child("rPr")
    }

    pub(crate) fn from_element(mut element: Element) -> Self {
        let mut text = String::new();
        element.children.retain(|node| match node {
            Node::Element(e) if e.local_name() == "t" => {
                text.push_str(&e.text_content());
                false
            }
            node => !node.is_whitespace(),
        });
        Self { element, text }
    }

    pub(crate) fn to_element(&self) -> Element {
        let mut element = self.element.clone();
        let t = Element::new(element.qualify("t"));
        let t = if self.text.is_empty() {
            t
        } else {
            t.with_text(self.text.clone())
        };
        element.children.push(Node::Element(t));
        element
    }
}

/// An item inside a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum ParagraphItem {
    /// Editable text run
    Run(Run),
    /// Any other inline element, kept as read
    Other(Element),
}

/// A paragraph (`a:p`).
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    /// The `a:p` element without children
    element: Element,
    items: Vec<ParagraphItem>,
}

impl Paragraph {
    /// Create an empty paragraph.
    pub fn new(prefix: &str) -> Self {
        Self {
            element: Element::new(format!("{}:p", prefix)),
            items: Vec::new(),
        }
    }

    /// Items in document order.
    pub fn items(&self) -> &[ParagraphItem] {
        &self.items
    }

    /// Runs in document order.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.items.iter().filter_map(|item| match item {
            ParagraphItem::Run(r) => Some(r),
            ParagraphItem::Other(_) => None,
        })
    }

    /// Mutable runs in document order.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.items.iter_mut().filter_map(|item| match item {
            ParagraphItem::Run(r) => Some(r),
            ParagraphItem::Other(_) => None,
        })
    }

    /// Paragraph properties (`a:pPr`), if present.
    pub fn properties(&self) -> Option<&Element> {
        self.other("pPr")
    }

    fn other(&self, local: &str) -> Option<&Element> {
        self.items.iter().find_map(|item| match item {
            ParagraphItem::Other(e) if e.local_name() == local => Some(e),
            _ => None,
        })
    }

    /// Visible text: runs and fields, with line breaks as `\v`.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for item in &self.items {
            match item {
                ParagraphItem::Run(r) => text.push_str(r.text()),
                ParagraphItem::Other(e) => match e.local_name() {
                    "br" => text.push(LINE_BREAK),
                    "fld" => {
                        if let Some(t) = e.child("t") {
                            text.push_str(&t.text_content());
                        }
                    }
                    _ => {}
                },
            }
        }
        text
    }

    /// Append an item.
    pub fn push(&mut self, item: ParagraphItem) {
        self.items.push(item);
    }

    pub(crate) fn from_element(mut element: Element) -> Self {
        let items = std::mem::take(&mut element.children)
            .into_iter()
            .filter_map(|node| match node {
                Node::Element(e) if e.local_name() == "r" => {
                    Some(ParagraphItem::Run(Run::from_element(e)))
                }
                Node::Element(e) => Some(ParagraphItem::Other(e)),
                _ => None,
            })
            .collect();
        Self { element, items }
    }

    pub(crate) fn to_element(&self) -> Element {
        let mut element = self.element.clone();
        element.children = self
            .items
            .iter()
            .map(|item| match item {
                ParagraphItem::Run(r) => Node::Element(r.to_element()),
                ParagraphItem::Other(e) => Node::Element(e.clone()),
            })
            .collect();
        element
    }
}

/// The text body of a shape (`p:txBody`).
#[derive(Debug, Clone, PartialEq)]
pub struct TextFrame {
    /// The `p:txBody` element holding only its non-paragraph children
    element: Element,
    paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    /// Paragraphs in order.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Mutable paragraphs in order.
    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }

    /// Full text, paragraphs joined with `\n`.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace the entire text of the frame.
    ///
    /// Each `\n` starts a new paragraph and each `\v` becomes a line break.
    /// New paragraphs take the properties of the first original paragraph
    /// and new runs those of the first original run, so the template's
    /// formatting carries over to the inserted text.
    pub fn set_text(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n");
        let prefix = self.drawing_prefix();
        let first = self.paragraphs.first();
        let paragraph_props = first.and_then(|p| p.properties()).cloned();
        let end_props = first.and_then(|p| p.other("endParaRPr")).cloned();
        let run_props = self
            .paragraphs
            .iter()
            .flat_map(|p| p.runs())
            .find_map(|r| r.properties())
            .cloned();
        let template = first
            .map(|p| p.element.clone())
            .unwrap_or_else(|| Element::new(format!("{}:p", prefix)));

        self.paragraphs = text
            .split('\n')
            .map(|line| {
                let mut paragraph = Paragraph {
                    element: template.clone(),
                    items: Vec::new(),
                };
                if let Some(props) = &paragraph_props {
                    paragraph.push(ParagraphItem::Other(props.clone()));
                }
                for (i, segment) in line.split(LINE_BREAK).enumerate() {
                    if i > 0 {
                        let mut br = Element::new(format!("{}:br", prefix));
                        if let Some(props) = &run_props {
                            br.children.push(Node::Element(props.clone()));
                        }
                        paragraph.push(ParagraphItem::Other(br));
                    }
                    if !segment.is_empty() {
                        paragraph.push(ParagraphItem::Run(Run::new(
                            &prefix,
                            run_props.clone(),
                            segment,
                        )));
                    }
                }
                if let Some(props) = &end_props {
                    paragraph.push(ParagraphItem::Other(props.clone()));
                }
                paragraph
            })
            .collect();
    }

    /// DrawingML prefix used by the body (normally `a`).
    fn drawing_prefix(&self) -> String {
        self.paragraphs
            .first()
            .and_then(|p| p.element.prefix())
            .or_else(|| self.element.child("bodyPr").and_then(|e| e.prefix()))
            .unwrap_or("a")
            .to_string()
    }

    pub(crate) fn from_element(mut element: Element) -> Self {
        let mut paragraphs = Vec::new();
        let mut rest = Vec::new();
        for node in std::mem::take(&mut element.children) {
            match node {
                Node::Element(e) if e.local_name() == "p" => {
                    paragraphs.push(Paragraph::from_element(e))
                }
                node if node.is_whitespace() => {}
                node => rest.push(node),
            }
        }
        element.children = rest;
        Self {
            element,
            paragraphs,
        }
    }

    pub(crate) fn to_element(&self) -> Element {
        let mut element = self.element.clone();
        element.children.extend(
            self.paragraphs
                .iter()
                .map(|p| Node::Element(p.to_element())),
        );
        element
    }
}
