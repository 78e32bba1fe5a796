//! Export of the drawing with its text removed, to be used as a background image under the
//! picture overlay.

use crate::document::Document;

/// Serializes a copy of `doc` in which every `<text>`/`<tspan>` has lost its character content.
///
/// Pass the document as parsed: spliced `<use>` copies would otherwise be written out and draw
/// twice.
///
/// The XML declaration and any DOCTYPE are dropped. Entities declared in the DOCTYPE are written
/// out already expanded.
pub fn strip_text(doc: &Document) -> String {
    let mut stripped = doc.clone();
    let targets: Vec<_> = stripped
        .descendants(stripped.document_node())
        .filter(|&id| stripped.is_text_element(id))
        .collect();
    for id in targets {
        stripped.clear_text(id);
    }
    stripped.to_xml_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clears_text_but_keeps_structure() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><text x="1" style="text-anchor:end">a<tspan>b</tspan>c</text><rect width="2"/></svg>"#;
        let doc = Document::parse(svg).expect("parse");
        let out = strip_text(&doc);
        assert!(!out.starts_with("<?xml"));
        assert!(out.contains(r#"<text x="1" style="text-anchor:end"><tspan/></text>"#), "{out}");
        assert!(out.contains(r#"<rect width="2"/>"#));

        let reparsed = Document::parse(&out).expect("reparse");
        let texts = reparsed
            .descendants(reparsed.document_node())
            .filter(|&id| reparsed.is_text_element(id))
            .count();
        assert_eq!(texts, 2);
    }

    #[test]
    fn prolog_is_dropped_and_entities_stay_expanded() {
        let svg = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd" [
  <!ENTITY fill "fill:#f00">
]>
<svg xmlns="http://www.w3.org/2000/svg"><rect style="&fill;" width="2"/><text>a</text></svg>"#;
        let doc = Document::parse(svg).expect("parse");
        let out = strip_text(&doc);
        assert!(out.starts_with("<svg"), "{out}");
        assert!(!out.contains("DOCTYPE"));
        assert!(out.contains(r#"style="fill:#f00""#), "{out}");
        Document::parse(&out).expect("reparse");
    }

    #[test]
    fn leaves_the_input_untouched() {
        let doc = Document::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"><text>keep</text></svg>"#)
            .expect("parse");
        let _ = strip_text(&doc);
        let text = doc.children(doc.root_element())[0];
        assert_eq!(doc.leading_text(text).as_deref(), Some("keep"));
    }
}
