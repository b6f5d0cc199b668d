use crate::model::{ShapeTree, Traversal};
use log::debug;

/// Replace every occurrence of `marker` inside individual runs of the
/// top-level text shapes.
///
/// A marker split across two runs is not found. Returns the number of
/// occurrences replaced.
pub fn replace_in_runs(shapes: &mut ShapeTree, marker: &str, replacement: &str) -> usize {
    if marker.is_empty() {
        return 0;
    }

    let mut replaced = 0;
    shapes.visit_mut(Traversal::TopLevel, &mut |shape| {
        let Some(frame) = shape.text_frame_mut() else {
            return;
        };
        if !frame.text().contains(marker) {
            return;
        }
        for paragraph in frame.paragraphs_mut() {
            for run in paragraph.runs_mut() {
                let count = run.text().matches(marker).count();
                if count > 0 {
                    let text = run.text().replace(marker, replacement);
                    run.set_text(text);
                    replaced += count;
                }
            }
        }
    });

    if replaced > 0 {
        debug!("Updating {} ({} occurrences)", marker, replaced);
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    fn tree(body: &str) -> ShapeTree {
        let xml = format!(
            r#"<p:spTree xmlns:a="a" xmlns:p="p">{}</p:spTree>"#,
            body
        );
        ShapeTree::from_children(XmlDocument::parse(&xml).unwrap().root.children)
    }

    fn text_shape(id: u32, runs: &[&str]) -> String {
        let runs: String = runs
            .iter()
            .map(|t| format!(r#"<a:r><a:rPr lang="en-US" b="1"/><a:t>{}</a:t></a:r>"#, t))
            .collect();
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Text {}"/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p>{}</a:p></p:txBody></p:sp>"#,
            id, id, runs
        )
    }

    fn texts(shapes: &ShapeTree) -> Vec<String> {
        shapes.shapes().iter().filter_map(|s| s.text()).collect()
    }

    #[test]
    fn test_replaces_marker_inside_run() {
        let mut shapes = tree(&text_shape(2, &["Welcome to [TOPIC]!"]));
        let n = replace_in_runs(&mut shapes, "[TOPIC]", "Rust");
        assert_eq!(n, 1);
        assert_eq!(texts(&shapes), vec!["Welcome to Rust!"]);

        // formatting of the run survives
        let run = shapes.get(0).unwrap().text_frame().unwrap().paragraphs()[0]
            .runs()
            .next()
            .unwrap()
            .properties()
            .unwrap()
            .attr("b")
            .map(str::to_string);
        assert_eq!(run.as_deref(), Some("1"));
    }

    #[test]
    fn test_replaces_every_occurrence_in_every_shape() {
        let body = format!(
            "{}{}",
            text_shape(2, &["[TOPIC] and [TOPIC]"]),
            text_shape(3, &["Intro: ", "[TOPIC]"])
        );
        let mut shapes = tree(&body);
        assert_eq!(replace_in_runs(&mut shapes, "[TOPIC]", "Loops"), 3);
        assert_eq!(texts(&shapes), vec!["Loops and Loops", "Intro: Loops"]);
    }

    /// Per shape: runs in each paragraph.
    fn structure(shapes: &ShapeTree) -> Vec<Vec<usize>> {
        shapes
            .shapes()
            .iter()
            .filter_map(|s| s.text_frame())
            .map(|f| f.paragraphs().iter().map(|p| p.runs().count()).collect())
            .collect()
    }

    #[test]
    fn test_structure_is_unchanged() {
        let body = format!(
            "{}{}{}",
            text_shape(2, &["[TOPIC] and [TOPIC]"]),
            text_shape(3, &["Intro: ", "[TOPIC]"]),
            r#"<p:sp><p:nvSpPr><p:cNvPr id="4" name="Two"/></p:nvSpPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>[TOPIC]</a:t></a:r></a:p><a:p><a:r><a:t>x</a:t></a:r><a:r><a:t>[TOPIC]</a:t></a:r></a:p></p:txBody></p:sp>"#
        );
        let mut shapes = tree(&body);
        let before = structure(&shapes);
        assert_eq!(before, vec![vec![1], vec![2], vec![1, 2]]);

        assert_eq!(replace_in_runs(&mut shapes, "[TOPIC]", "a longer replacement"), 5);
        assert_eq!(shapes.len(), 3);
        assert_eq!(structure(&shapes), before);
    }

    #[test]
    fn test_marker_split_across_runs_is_not_found() {
        let mut shapes = tree(&text_shape(2, &["[TOP", "IC]"]));
        assert_eq!(replace_in_runs(&mut shapes, "[TOPIC]", "Rust"), 0);
        assert_eq!(texts(&shapes), vec!["[TOPIC]"]);
    }

    #[test]
    fn test_absent_or_empty_marker_is_noop() {
        let mut shapes = tree(&text_shape(2, &["Plain text"]));
        let before = shapes.clone();
        assert_eq!(replace_in_runs(&mut shapes, "[TOPIC]", "Rust"), 0);
        assert_eq!(replace_in_runs(&mut shapes, "", "Rust"), 0);
        assert_eq!(shapes, before);
    }

    #[test]
    fn test_groups_are_not_searched() {
        let body = format!(
            r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="5" name="Group 4"/></p:nvGrpSpPr><p:grpSpPr/>{}</p:grpSp>"#,
            text_shape(6, &["[TOPIC]"])
        );
        let mut shapes = tree(&body);
        assert_eq!(replace_in_runs(&mut shapes, "[TOPIC]", "Rust"), 0);
    }
}
