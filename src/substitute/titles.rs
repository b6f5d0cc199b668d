use crate::model::{ShapeTree, Traversal};
use log::debug;

/// Positional `[TITLE-i]` labels paired with their replacements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleLabels {
    /// `(label, replacement)`, label `i` at position `i - 1`
    entries: Vec<(String, String)>,
}

impl TitleLabels {
    /// Label the items `[TITLE-1]`, `[TITLE-2]`, ... in order.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (format!("[TITLE-{}]", i + 1), item.into()))
            .collect();
        Self { entries }
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no labels.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replacement for a shape whose text contains a label. Labels are
    /// tried in index order against the trimmed text; the first one found
    /// wins.
    pub fn resolve(&self, text: &str) -> Option<&str> {
        let text = text.trim();
        self.entries
            .iter()
            .find(|(label, _)| text.contains(label.as_str()))
            .map(|(_, replacement)| replacement.as_str())
    }
}

/// Replace the whole text of every labelled text shape, descending into
/// groups. Returns the number of shapes rewritten.
pub fn replace_titles(shapes: &mut ShapeTree, labels: &TitleLabels) -> usize {
    if labels.is_empty() {
        return 0;
    }

    let mut replaced = 0;
    shapes.visit_mut(Traversal::Recursive, &mut |shape| {
        let Some(frame) = shape.text_frame_mut() else {
            return;
        };
        if let Some(title) = labels.resolve(&frame.text()) {
            debug!("Updating title -> {}", title);
            frame.set_text(title);
            replaced += 1;
        }
    });
    replaced
}
