//! Text alignment inherited through `style`.

use crate::document::{Document, NodeId};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Where a string is pinned relative to its anchor point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Text extends to the right of the point.
    #[default]
    Start,
    Middle,
    /// Text extends to the left of the point.
    End,
}

impl Anchor {
    /// Reads the leading keyword, so `end !important` is `End`.
    pub fn from_keyword(raw: &str) -> Option<Self> {
        let raw = raw.split('!').next()?.split_whitespace().next()?;
        if raw.eq_ignore_ascii_case("center") || raw.eq_ignore_ascii_case("middle") {
            Some(Self::Middle)
        } else if raw.eq_ignore_ascii_case("end") {
            Some(Self::End)
        } else if raw.eq_ignore_ascii_case("start") {
            Some(Self::Start)
        } else {
            None
        }
    }

    /// LaTeX `\makebox` position code.
    pub fn box_position(self) -> &'static str {
        match self {
            Self::Start => "bl",
            Self::Middle => "bc",
            Self::End => "br",
        }
    }
}

/// `(property, value)` pairs of an inline `style` attribute, in source order.
fn style_declarations(style: &str) -> impl Iterator<Item = (&str, &str)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?:^|;)\s*([A-Za-z-]+)\s*:\s*([^;]*)").expect("style declaration regex")
    });
    re.captures_iter(style).filter_map(|c| {
        let name = c.get(1)?.as_str();
        let value = c.get(2)?.as_str().trim();
        Some((name, value))
    })
}

fn style_property<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    style_declarations(style)
        .find(|(name, _)| name.eq_ignore_ascii_case(property))
        .map(|(_, value)| value)
}

/// The alignment `id` itself declares, if any.
///
/// `text-align` wins over `text-anchor` when the style has both; the `text-anchor` presentation
/// attribute is only consulted when the style names neither.
fn alignment_hint(doc: &Document, id: NodeId) -> Option<Anchor> {
    let declared = doc
        .attribute(id, "style")
        .and_then(|style| {
            style_property(style, "text-align").or_else(|| style_property(style, "text-anchor"))
        })
        .or_else(|| doc.attribute(id, "text-anchor"))?;
    Anchor::from_keyword(declared)
}

/// First alignment found walking from `id` to the root, else [`Anchor::Start`].
pub fn resolve_anchor(doc: &Document, id: NodeId) -> Anchor {
    doc.ancestors(id)
        .find_map(|ancestor| alignment_hint(doc, ancestor))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor_of(svg: &str, xml_id: &str) -> Anchor {
        let doc = Document::parse(svg).expect("parse");
        let id = *doc.id_index().get(xml_id).expect("id");
        resolve_anchor(&doc, id)
    }

    #[test]
    fn defaults_to_start() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><text id="t">a</text></svg>"#;
        assert_eq!(anchor_of(svg, "t"), Anchor::Start);
    }

    #[test]
    fn closest_declaration_wins() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <text style="text-align:end"><tspan id="t" style="text-align:center">a</tspan></text>
</svg>"#;
        assert_eq!(anchor_of(svg, "t"), Anchor::Middle);
    }

    #[test]
    fn inherits_from_ancestors() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <g style="font-size:12px;text-anchor:end"><text><tspan id="t">a</tspan></text></g>
</svg>"#;
        assert_eq!(anchor_of(svg, "t"), Anchor::End);
    }

    #[test]
    fn text_align_is_preferred_over_text_anchor() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <text id="t" style="text-anchor:end; text-align:start">a</text>
</svg>"#;
        assert_eq!(anchor_of(svg, "t"), Anchor::Start);
    }

    #[test]
    fn unrecognized_value_keeps_walking() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <g style="text-anchor:middle"><text id="t" style="text-align:justify">a</text></g>
</svg>"#;
        assert_eq!(anchor_of(svg, "t"), Anchor::Middle);
    }

    #[test]
    fn presentation_attribute_is_a_fallback() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <text id="t" text-anchor="end" style="fill:#000">a</text>
  <text id="u" text-anchor="end" style="text-anchor:middle">b</text>
</svg>"#;
        assert_eq!(anchor_of(svg, "t"), Anchor::End);
        assert_eq!(anchor_of(svg, "u"), Anchor::Middle);
    }

    #[test]
    fn similarly_named_properties_do_not_match() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <text id="t" style="-inkscape-text-align:end;line-height:125%">a</text>
</svg>"#;
        assert_eq!(anchor_of(svg, "t"), Anchor::Start);
    }

    #[test]
    fn keywords_map_to_box_positions() {
        assert_eq!(Anchor::from_keyword(" CENTER ").map(Anchor::box_position), Some("bc"));
        assert_eq!(Anchor::from_keyword("end").map(Anchor::box_position), Some("br"));
        assert_eq!(Anchor::from_keyword("start").map(Anchor::box_position), Some("bl"));
        assert_eq!(Anchor::from_keyword("left"), None);
        assert_eq!(Anchor::from_keyword("   "), None);
    }

    #[test]
    fn important_declarations_keep_their_keyword() {
        assert_eq!(Anchor::from_keyword("end !important"), Some(Anchor::End));
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <g text-anchor="start"><text id="t" style="text-anchor: middle !important">a</text></g>
  <text id="u" style="text-align:end!important">b</text>
</svg>"#;
        assert_eq!(anchor_of(svg, "t"), Anchor::Middle);
        assert_eq!(anchor_of(svg, "u"), Anchor::End);
    }
}
