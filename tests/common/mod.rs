//! Synthetic PPTX templates shared by the integration tests and benchmarks.

#![allow(dead_code)]

use deckfill::{Shape, Slide, Traversal};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Smallest valid PNG header, enough for format sniffing.
pub const PNG: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// JPEG start-of-image marker.
pub const JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

/// A text box whose single paragraph holds the given runs.
pub fn text_box(id: u32, runs: &[&str]) -> String {
    let runs: String = runs
        .iter()
        .map(|t| {
            format!(
                r#"<a:r><a:rPr lang="en-US" sz="2400" dirty="0"/><a:t>{}</a:t></a:r>"#,
                t
            )
        })
        .collect();
    format!(
        r#"
      <p:sp>
        <p:nvSpPr><p:cNvPr id="{id}" name="TextBox {n}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
        <p:spPr><a:xfrm><a:off x="457200" y="{y}"/><a:ext cx="8229600" cy="914400"/></a:xfrm></p:spPr>
        <p:txBody><a:bodyPr wrap="square"/><a:lstStyle/><a:p><a:pPr algn="l"/>{runs}<a:endParaRPr lang="en-US"/></a:p></p:txBody>
      </p:sp>"#,
        id = id,
        n = id - 1,
        y = id as i64 * 100_000,
        runs = runs
    )
}

/// A picture embedding relationship `rel_id`.
pub fn picture(id: u32, rel_id: &str, x: i64, y: i64, cx: i64, cy: i64) -> String {
    format!(
        r#"
      <p:pic>
        <p:nvPicPr><p:cNvPr id="{id}" name="Picture {n}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>
        <p:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>
        <p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>
      </p:pic>"#,
        id = id,
        n = id - 1,
        rel = rel_id,
        x = x,
        y = y,
        cx = cx,
        cy = cy
    )
}

/// A group shape around `children`.
pub fn group(id: u32, children: &str) -> String {
    format!(
        r#"
      <p:grpSp>
        <p:nvGrpSpPr><p:cNvPr id="{id}" name="Group {n}"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
        <p:grpSpPr/>{children}
      </p:grpSp>"#,
        id = id,
        n = id - 1,
        children = children
    )
}

/// A full slide part around the given shapes.
pub fn slide_xml(shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {ns}>
  <p:cSld>
    <p:spTree>
      <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
      <p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></a:xfrm></p:grpSpPr>{shapes}
    </p:spTree>
  </p:cSld>
  <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#,
        ns = NAMESPACES,
        shapes = shapes
    )
}

/// Cover slide: `[TOPIC]` inside a sentence and `[SUBTOPICS]` on its own.
pub fn cover_slide() -> String {
    slide_xml(&format!(
        "{}{}",
        text_box(2, &["Welcome to ", "[TOPIC]"]),
        text_box(3, &["[SUBTOPICS]"])
    ))
}

/// Slide of `[TITLE-1]`..`[TITLE-count]` labels nested two groups deep,
/// under a static heading.
pub fn titles_slide(heading: &str, count: u32) -> String {
    let labels: Vec<String> = (1..=count)
        .map(|i| text_box(10 + i, &[&format!("[TITLE-{}]", i)]))
        .collect();
    let (outer, inner) = labels.split_at(labels.len() / 2);
    let nested = group(4, &inner.concat());
    slide_xml(&format!(
        "{}{}",
        text_box(2, &[heading]),
        group(3, &format!("{}{}", outer.concat(), nested))
    ))
}

/// Content slide: four placeholders and two sample pictures.
pub fn content_slide() -> String {
    slide_xml(&format!(
        "{}{}{}{}{}{}",
        text_box(2, &["[SUBTOPIC]"]),
        text_box(3, &["[SUBTOPIC EXPLAINS]"]),
        text_box(4, &["[SYNTAX]"]),
        picture(5, "rId2", 457_200, 3_200_400, 4_000_000, 2_500_000),
        text_box(6, &["[EXPLAIN]"]),
        picture(7, "rId3", 4_800_000, 3_200_400, 3_800_000, 2_500_000),
    ))
}

/// Slides of the standard 16-slide template.
pub fn standard_slides() -> Vec<String> {
    let mut slides = vec![cover_slide(), titles_slide("Agenda", 6)];
    slides.extend((0..13).map(|_| content_slide()));
    slides.push(titles_slide("Summary", 10));
    slides
}

/// A picture placeholder (`p:ph type="pic"`) with no transform of its own.
pub fn picture_placeholder(id: u32, rel_id: &str, idx: u32) -> String {
    format!(
        r#"
      <p:pic>
        <p:nvPicPr><p:cNvPr id="{id}" name="Picture Placeholder {n}"/><p:cNvPicPr/><p:nvPr><p:ph type="pic" idx="{idx}"/></p:nvPr></p:nvPicPr>
        <p:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>
        <p:spPr/>
      </p:pic>"#,
        id = id,
        n = id - 1,
        idx = idx,
        rel = rel_id
    )
}

/// Slide layout with picture slots `(idx, x, y, cx, cy)`.
pub fn layout_xml(slots: &[(u32, i64, i64, i64, i64)]) -> String {
    let shapes: String = slots
        .iter()
        .enumerate()
        .map(|(i, (idx, x, y, cx, cy))| {
            format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Picture Placeholder {n}"/><p:cNvSpPr/><p:nvPr><p:ph type="pic" idx="{idx}"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr></p:sp>"#,
                id = i + 2,
                n = i + 1,
                idx = idx,
                x = x,
                y = y,
                cx = cx,
                cy = cy
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout {ns}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld></p:sldLayout>"#,
        ns = NAMESPACES,
        shapes = shapes
    )
}

/// Package the given slide parts as a presentation.
pub fn build_pptx(slides: &[String]) -> Vec<u8> {
    build_pptx_with_parts(slides, &[])
}

/// Package the given slide parts plus extra `(name, xml)` parts.
pub fn build_pptx_with_parts(slides: &[String], parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut overrides = String::new();
    for i in 1..=slides.len() {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            i
        ));
    }
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  {}
</Types>"#,
            overrides
        )
        .as_bytes(),
    )
    .unwrap();

    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#,
    )
    .unwrap();

    let mut ids = String::new();
    let mut rels = String::new();
    for i in 1..=slides.len() {
        ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            255 + i,
            i + 1
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
            i + 1,
            i
        ));
    }

    zip.start_file("ppt/presentation.xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {}>
  <p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
  <p:sldIdLst>{}</p:sldIdLst>
  <p:sldSz cx="9144000" cy="6858000"/>
</p:presentation>"#,
            NAMESPACES, ids
        )
        .as_bytes(),
    )
    .unwrap();

    zip.start_file("ppt/_rels/presentation.xml.rels", options)
        .unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>{}</Relationships>"#,
            rels
        )
        .as_bytes(),
    )
    .unwrap();

    for (i, xml) in slides.iter().enumerate() {
        let n = i + 1;
        zip.start_file(format!("ppt/slides/slide{}.xml", n), options)
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();

        zip.start_file(format!("ppt/slides/_rels/slide{}.xml.rels", n), options)
            .unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image2.png"/></Relationships>"#,
        )
        .unwrap();
    }

    for (name, xml) in parts {
        zip.start_file(*name, options).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }

    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for name in ["ppt/media/image1.png", "ppt/media/image2.png"] {
        zip.start_file(name, stored).unwrap();
        zip.write_all(&PNG).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// The standard 16-slide template.
pub fn standard_template() -> Vec<u8> {
    build_pptx(&standard_slides())
}

/// Write `data` as `Template.pptx` under `dir`.
pub fn write_template(dir: &Path, data: &[u8]) -> PathBuf {
    let path = dir.join("Template.pptx");
    std::fs::write(&path, data).unwrap();
    path
}

/// Every shape text on a slide, groups included, in visit order.
pub fn slide_texts(slide: &Slide) -> Vec<String> {
    let mut texts = Vec::new();
    slide
        .shapes()
        .visit(Traversal::Recursive, &mut |shape: &Shape| texts.extend(shape.text()));
    texts
}
