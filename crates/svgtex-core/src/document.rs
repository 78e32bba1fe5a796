//! Owned, mutable SVG element tree.
//!
//! `roxmltree` gives a read-only view; reference expansion needs to splice deep copies into the
//! tree and the textless export needs to clear text and write the document back, so the parsed
//! document is imported into a small arena addressed by [`NodeId`].

mod write;

use crate::error::{Error, Result};
use crate::length;
use rustc_hash::FxHashMap;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub(crate) const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// `(prefix, uri)`; a `None` prefix is the default namespace.
pub type NamespaceDecl = (Option<String>, String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    /// Namespace declarations written on this element.
    pub namespace_decls: Vec<NamespaceDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        value: Option<String>,
    },
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Set on the root of a spliced copy: the id of the element it was copied from.
    copied_from: Option<String>,
}

/// Root `width`/`height` in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    pub fn parse(text: &str) -> Result<Self> {
        let mut options = roxmltree::ParsingOptions::default();
        // Inkscape and Illustrator exports routinely carry a DOCTYPE.
        options.allow_dtd = true;
        let xml = roxmltree::Document::parse_with_options(text, options)?;

        let mut doc = Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
                copied_from: None,
            }],
        };
        let document_node = doc.document_node();
        for child in xml.root().children() {
            doc.import(child, document_node);
        }
        Ok(doc)
    }

    fn import(&mut self, node: roxmltree::Node<'_, '_>, parent: NodeId) {
        let kind = match node.node_type() {
            roxmltree::NodeType::Root => return,
            roxmltree::NodeType::Element => NodeKind::Element(import_element(node)),
            roxmltree::NodeType::Text => NodeKind::Text(node.text().unwrap_or_default().to_string()),
            roxmltree::NodeType::Comment => {
                NodeKind::Comment(node.text().unwrap_or_default().to_string())
            }
            roxmltree::NodeType::PI => {
                let Some(pi) = node.pi() else {
                    return;
                };
                NodeKind::ProcessingInstruction {
                    target: pi.target.to_string(),
                    value: pi.value.map(str::to_string),
                }
            }
        };
        let id = self.append(parent, kind);
        for child in node.children() {
            self.import(child, id);
        }
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            copied_from: None,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn document_node(&self) -> NodeId {
        NodeId(0)
    }

    /// The outermost element (`<svg>`). A parsed document always has one.
    pub fn root_element(&self) -> NodeId {
        self.children(self.document_node())
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
            .unwrap_or_else(|| self.document_node())
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub(crate) fn copied_from(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].copied_from.as_deref()
    }

    /// `[node, parent, ..., root]`, elements only.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |&cur| self.parent(cur))
            .take_while(|&cur| self.is_element(cur))
    }

    /// Pre-order traversal of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Element local name, if `id` is an element in the SVG namespace (or in no namespace).
    pub fn svg_name(&self, id: NodeId) -> Option<&str> {
        let el = self.element(id)?;
        match el.name.namespace.as_deref() {
            None | Some(SVG_NS) => Some(el.name.local.as_str()),
            Some(_) => None,
        }
    }

    pub fn is_svg_element(&self, id: NodeId, local: &str) -> bool {
        self.svg_name(id) == Some(local)
    }

    /// `<text>` or `<tspan>`.
    pub fn is_text_element(&self, id: NodeId) -> bool {
        matches!(self.svg_name(id), Some("text" | "tspan"))
    }

    /// Un-namespaced attribute value.
    pub fn attribute(&self, id: NodeId, local: &str) -> Option<&str> {
        self.attribute_ns(id, None, local)
    }

    pub fn attribute_ns(&self, id: NodeId, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|a| a.name.local == local && a.name.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    /// Character data before the first child element, or `None` if there is none.
    pub fn leading_text(&self, id: NodeId) -> Option<String> {
        let mut out: Option<String> = None;
        for &child in self.children(id) {
            match self.kind(child) {
                NodeKind::Text(text) => out.get_or_insert_with(String::new).push_str(text),
                NodeKind::Element(_) => break,
                _ => {}
            }
        }
        out
    }

    /// Removes the character data directly inside `id` (child elements are kept).
    pub fn clear_text(&mut self, id: NodeId) {
        let kept: Vec<NodeId> = self
            .children(id)
            .iter()
            .copied()
            .filter(|&child| !matches!(self.kind(child), NodeKind::Text(_)))
            .collect();
        self.nodes[id.0].children = kept;
    }

    /// Short human-readable label for diagnostics, e.g. `text#title`.
    pub fn describe(&self, id: NodeId) -> String {
        let Some(el) = self.element(id) else {
            return "#node".to_string();
        };
        match self.attribute(id, "id") {
            Some(xml_id) => format!("{}#{}", el.name.local, xml_id),
            None => el.name.local.clone(),
        }
    }

    /// Maps every `id` attribute to the first element carrying it, in document order.
    pub fn id_index(&self) -> FxHashMap<String, NodeId> {
        let mut index = FxHashMap::default();
        for id in self.descendants(self.document_node()) {
            if let Some(xml_id) = self.attribute(id, "id") {
                index.entry(xml_id.to_string()).or_insert(id);
            }
        }
        index
    }

    /// Namespace bindings visible at `id`; the nearest declaration of a prefix wins.
    pub fn in_scope_namespaces(&self, id: NodeId) -> Vec<NamespaceDecl> {
        let mut out: Vec<NamespaceDecl> = Vec::new();
        for ancestor in self.ancestors(id) {
            let Some(el) = self.element(ancestor) else {
                continue;
            };
            for (prefix, uri) in &el.namespace_decls {
                if !out.iter().any(|(p, _)| p == prefix) {
                    out.push((prefix.clone(), uri.clone()));
                }
            }
        }
        out
    }

    /// Appends a structural clone of `source` as the last child of `parent` and returns the
    /// clone's root. The clone shares no storage with `source`.
    pub fn deep_copy(&mut self, source: NodeId, parent: NodeId) -> NodeId {
        let snapshot = self.snapshot(source);
        self.splice(snapshot, parent)
    }

    /// Like [`Document::deep_copy`], but copies `source` out of `from` (typically an untouched
    /// clone of this document) so content spliced earlier is not copied again.
    pub fn deep_copy_from(&mut self, from: &Document, source: NodeId, parent: NodeId) -> NodeId {
        let snapshot = from.snapshot(source);
        self.splice(snapshot, parent)
    }

    fn snapshot(&self, source: NodeId) -> Snapshot {
        let mut nodes = Vec::new();
        let mut stack = vec![(source, None)];
        while let Some((id, parent)) = stack.pop() {
            let index = nodes.len();
            nodes.push((self.kind(id).clone(), parent));
            stack.extend(self.children(id).iter().rev().map(|&child| (child, Some(index))));
        }
        Snapshot {
            nodes,
            namespaces: self.in_scope_namespaces(source),
            xml_id: self.attribute(source, "id").map(str::to_string),
        }
    }

    fn splice(&mut self, snapshot: Snapshot, parent: NodeId) -> NodeId {
        let visible_at_parent = self.in_scope_namespaces(parent);
        let mut ids: Vec<NodeId> = Vec::with_capacity(snapshot.nodes.len());
        for (kind, snapshot_parent) in snapshot.nodes {
            let attach_to = snapshot_parent.map_or(parent, |index| ids[index]);
            ids.push(self.append(attach_to, kind));
        }
        let copy = ids[0];

        if let NodeKind::Element(el) = &mut self.nodes[copy.0].kind {
            for decl in snapshot.namespaces {
                let shadowed = visible_at_parent.contains(&decl)
                    || el.namespace_decls.iter().any(|(prefix, _)| *prefix == decl.0);
                if !shadowed {
                    el.namespace_decls.push(decl);
                }
            }
        }
        self.nodes[copy.0].copied_from = snapshot.xml_id;
        copy
    }

    /// Root `width`/`height`. Both must be present and plain numbers (or `px` lengths).
    pub fn dimensions(&self) -> Result<Dimensions> {
        let root = self.root_element();
        let read = |attribute: &'static str| -> Result<f64> {
            let raw = self
                .attribute(root, attribute)
                .ok_or(Error::MissingDimension { attribute })?;
            length::user_length(raw).ok_or_else(|| Error::InvalidDimension {
                attribute,
                value: raw.to_string(),
            })
        };
        Ok(Dimensions {
            width: read("width")?,
            height: read("height")?,
        })
    }
}

struct Snapshot {
    /// Pre-order; each entry points at its parent's index.
    nodes: Vec<(NodeKind, Option<usize>)>,
    namespaces: Vec<NamespaceDecl>,
    xml_id: Option<String>,
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

fn import_element(node: roxmltree::Node<'_, '_>) -> Element {
    let bindings: Vec<(Option<&str>, &str)> =
        node.namespaces().map(|ns| (ns.name(), ns.uri())).collect();
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    let namespace_decls = bindings
        .iter()
        .filter(|(_, uri)| *uri != XML_NS)
        .filter(|binding| !inherited.contains(binding))
        .map(|(prefix, uri)| (prefix.map(str::to_string), uri.to_string()))
        .collect();

    let tag = node.tag_name();
    let name = QName {
        namespace: tag.namespace().map(str::to_string),
        prefix: tag
            .namespace()
            .and_then(|uri| prefix_for(&bindings, uri, true)),
        local: tag.name().to_string(),
    };

    let attributes = node
        .attributes()
        .map(|attr| Attribute {
            name: QName {
                namespace: attr.namespace().map(str::to_string),
                prefix: attr
                    .namespace()
                    .and_then(|uri| prefix_for(&bindings, uri, false)),
                local: attr.name().to_string(),
            },
            value: attr.value().to_string(),
        })
        .collect();

    Element {
        name,
        attributes,
        namespace_decls,
    }
}

/// Prefix to write for `uri`. Elements prefer the default namespace; attributes cannot use it.
fn prefix_for(bindings: &[(Option<&str>, &str)], uri: &str, allow_default: bool) -> Option<String> {
    if uri == XML_NS {
        return Some("xml".to_string());
    }
    let matching = || bindings.iter().filter(|(_, u)| *u == uri);
    if allow_default && matching().any(|(prefix, _)| prefix.is_none()) {
        return None;
    }
    matching().find_map(|(prefix, _)| *prefix).map(str::to_string)
}
