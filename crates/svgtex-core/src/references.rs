//! Expansion of `<use>` references.
//!
//! Each `<use>` receives a deep copy of the element it references as its last child, so the
//! `<use>` element's own `transform`/`x`/`y` stay in the ancestor chain of the copied content.

use crate::document::{Document, NodeId, XLINK_NS};
use crate::warning::{Warning, report};
use std::collections::VecDeque;

/// Upper bound on spliced copies per document; nested references can otherwise grow
/// exponentially.
pub const MAX_EXPANSIONS: usize = 10_000;

fn href(doc: &Document, id: NodeId) -> Option<&str> {
    doc.attribute_ns(id, Some(XLINK_NS), "href")
        .or_else(|| doc.attribute(id, "href"))
}

fn is_use(doc: &Document, id: NodeId) -> bool {
    doc.is_svg_element(id, "use")
}

/// `true` if expanding `target` under `use_el` would copy a subtree into itself.
fn is_cyclic(doc: &Document, use_el: NodeId, target: NodeId, target_id: &str) -> bool {
    doc.ancestors(use_el)
        .any(|ancestor| ancestor == target || doc.copied_from(ancestor) == Some(target_id))
}

/// Splices a copy of every referenced element under its `<use>`, including `<use>` elements
/// that only appear inside spliced copies. Ids resolve against, and copies are taken from, the
/// document as it was before any copy was made.
pub fn resolve_references(doc: &mut Document) -> Vec<Warning> {
    let pristine = doc.clone();
    let ids = pristine.id_index();
    let mut warnings = Vec::new();
    let mut pending: VecDeque<NodeId> = doc
        .descendants(doc.document_node())
        .filter(|&id| is_use(doc, id))
        .collect();
    let mut expansions = 0usize;

    while let Some(use_el) = pending.pop_front() {
        let Some(raw) = href(doc, use_el) else {
            continue;
        };
        let raw = raw.trim().to_string();
        if raw.is_empty() {
            continue;
        }
        let Some(target_id) = raw.strip_prefix('#') else {
            report(
                &mut warnings,
                Warning::ExternalReference { href: raw.clone() },
            );
            continue;
        };
        let Some(&target) = ids.get(target_id) else {
            report(
                &mut warnings,
                Warning::MissingReference {
                    id: target_id.to_string(),
                },
            );
            continue;
        };
        if is_cyclic(doc, use_el, target, target_id) {
            report(
                &mut warnings,
                Warning::CyclicReference {
                    id: target_id.to_string(),
                },
            );
            continue;
        }
        if expansions == MAX_EXPANSIONS {
            report(
                &mut warnings,
                Warning::ExpansionLimit {
                    limit: MAX_EXPANSIONS,
                },
            );
            break;
        }

        let copy = doc.deep_copy_from(&pristine, target, use_el);
        expansions += 1;
        tracing::debug!(
            reference = target_id,
            under = %doc.describe(use_el),
            "expanded reference"
        );
        pending.extend(doc.descendants(copy).filter(|&id| is_use(doc, id)));
    }

    warnings
}
