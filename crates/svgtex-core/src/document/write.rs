use super::{Document, NodeId, NodeKind, QName};

impl Document {
    /// Serializes the document back to XML.
    ///
    /// Neither the XML declaration nor the DOCTYPE is written; top-level comments and processing
    /// instructions are.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        for (i, &child) in self.children(self.document_node()).iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.write_node(&mut out, child);
        }
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId) {
        match self.kind(id) {
            NodeKind::Document => {
                for &child in self.children(id) {
                    self.write_node(out, child);
                }
            }
            NodeKind::Text(text) => escape_into(out, text, false),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::ProcessingInstruction { target, value } => {
                out.push_str("<?");
                out.push_str(target);
                if let Some(value) = value {
                    out.push(' ');
                    out.push_str(value);
                }
                out.push_str("?>");
            }
            NodeKind::Element(el) => {
                out.push('<');
                push_qname(out, &el.name);
                for (prefix, uri) in &el.namespace_decls {
                    out.push_str(" xmlns");
                    if let Some(prefix) = prefix {
                        out.push(':');
                        out.push_str(prefix);
                    }
                    out.push_str("=\"");
                    escape_into(out, uri, true);
                    out.push('"');
                }
                for attr in &el.attributes {
                    out.push(' ');
                    push_qname(out, &attr.name);
                    out.push_str("=\"");
                    escape_into(out, &attr.value, true);
                    out.push('"');
                }

                let children = self.children(id);
                if children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for &child in children {
                    self.write_node(out, child);
                }
                out.push_str("</");
                push_qname(out, &el.name);
                out.push('>');
            }
        }
    }
}

fn push_qname(out: &mut String, name: &QName) {
    if let Some(prefix) = &name.prefix {
        out.push_str(prefix);
        out.push(':');
    }
    out.push_str(&name.local);
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    let bytes = text.as_bytes();
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        let esc = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' if attribute => "&quot;",
            b'\n' if attribute => "&#10;",
            b'\t' if attribute => "&#9;",
            _ => continue,
        };
        if start < i {
            out.push_str(&text[start..i]);
        }
        out.push_str(esc);
        start = i + 1;
    }
    if start < text.len() {
        out.push_str(&text[start..]);
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Document, SVG_NS, XLINK_NS};

    #[test]
    fn writes_namespaces_prefixes_and_escapes() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="1" height="1"><!-- note --><text title="a &quot;b&quot; &amp; c">x &lt; y</text><use xlink:href="#t"/></svg>"##;
        let written = Document::parse(svg).expect("parse").to_xml_string();
        assert!(written.starts_with("<svg "), "{written}");
        assert!(written.contains(r#" xmlns="http://www.w3.org/2000/svg""#));
        assert!(written.contains(r#" xmlns:xlink="http://www.w3.org/1999/xlink""#));
        assert!(written.contains(r#" width="1" height="1">"#));
        assert!(written.contains(
            r##"><!-- note --><text title="a &quot;b&quot; &amp; c">x &lt; y</text><use xlink:href="#t"/></svg>"##
        ));
    }

    #[test]
    fn output_parses_back_to_the_same_tree() {
        let svg = r##"<?xml-stylesheet href="style.css"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="10" height="10">
  <g transform="rotate(5)"><text x="1" xml:space="preserve">a<tspan>b</tspan></text></g>
  <use xlink:href="#g"/>
</svg>"##;
        let doc = Document::parse(svg).expect("parse");
        let written = doc.to_xml_string();
        let reparsed = Document::parse(&written).expect("reparse");
        assert_eq!(reparsed.to_xml_string(), written);

        let use_el = reparsed
            .descendants(reparsed.root_element())
            .find(|&id| reparsed.is_svg_element(id, "use"))
            .expect("use");
        assert_eq!(reparsed.attribute_ns(use_el, Some(XLINK_NS), "href"), Some("#g"));
        let root = reparsed.element(reparsed.root_element()).expect("root");
        assert_eq!(root.name.namespace.as_deref(), Some(SVG_NS));
        assert!(written.contains(r#"xml:space="preserve""#));
        assert!(written.starts_with(r#"<?xml-stylesheet href="style.css"?>"#));
    }

    #[test]
    fn copies_into_foreign_scope_carry_their_namespaces() {
        let svg = r##"<root><svg:g xmlns:svg="http://www.w3.org/2000/svg" id="g"><svg:text>hi</svg:text></svg:g><holder/></root>"##;
        let mut doc = Document::parse(svg).expect("parse");
        let g = *doc.id_index().get("g").expect("g");
        let holder = doc
            .descendants(doc.root_element())
            .find(|&id| doc.element(id).is_some_and(|el| el.name.local == "holder"))
            .expect("holder");
        doc.deep_copy(g, holder);

        let written = doc.to_xml_string();
        let reparsed = Document::parse(&written).expect("copy keeps namespace bindings");
        let texts = reparsed
            .descendants(reparsed.root_element())
            .filter(|&id| reparsed.is_svg_element(id, "text"))
            .count();
        assert_eq!(texts, 2);
    }
}
