//! Text extraction and rotation resolution.

use crate::ExtractOptions;
use crate::align::{Anchor, resolve_anchor};
use crate::document::{Document, NodeId};
use crate::error::Result;
use crate::geom::{Point, Vector, point};
use crate::length;
use crate::matrix::{AffineMatrix, compose};
use crate::transform::compile_transform_list;
use crate::warning::{Warning, report};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// Horizontal offset of the direction probe, in pre-transform user units.
pub const PROBE_OFFSET: f64 = 100.0;

/// One text fragment in final document coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedText {
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Baseline angle in degrees, in `(-90, 90]`; `0` when no transform applies.
    pub rotation_degrees: f64,
    pub anchor: Anchor,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    /// In document order.
    pub texts: Vec<ResolvedText>,
    pub warnings: Vec<Warning>,
}

/// Extracts every non-blank `<text>`/`<tspan>` of `doc`.
///
/// `doc` is expected to have had its references resolved already (see
/// [`crate::references::resolve_references`]).
pub fn extract_texts(doc: &Document, options: &ExtractOptions) -> Result<Extraction> {
    let mut extractor = Extractor {
        doc,
        options,
        transforms: FxHashMap::default(),
        reported: FxHashSet::default(),
        warnings: Vec::new(),
    };

    let mut texts = Vec::new();
    for id in doc.descendants(doc.root_element()) {
        if !doc.is_text_element(id) {
            continue;
        }
        let Some(text) = doc.leading_text(id) else {
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }
        if !options.include_defs && doc.ancestors(id).any(|a| doc.is_svg_element(a, "defs")) {
            continue;
        }
        texts.push(extractor.resolve(id, text)?);
    }

    Ok(Extraction {
        texts,
        warnings: extractor.warnings,
    })
}

struct Extractor<'a> {
    doc: &'a Document,
    options: &'a ExtractOptions,
    /// Compiled `transform` (plus `use` offset) per element, parsed once per run.
    transforms: FxHashMap<NodeId, Vec<AffineMatrix>>,
    /// Coordinate attributes already warned about.
    reported: FxHashSet<(NodeId, &'static str)>,
    warnings: Vec<Warning>,
}

impl Extractor<'_> {
    fn resolve(&mut self, id: NodeId, text: String) -> Result<ResolvedText> {
        let doc = self.doc;
        let base = self.base_point(id);
        let anchor = resolve_anchor(doc, id);

        let chain: Vec<NodeId> = doc.ancestors(id).collect();
        let mut stack: Vec<AffineMatrix> = Vec::new();
        for &ancestor in chain.iter().rev() {
            stack.extend_from_slice(self.local_transform(ancestor)?);
        }

        let (position, rotation_degrees) = match compose(&stack) {
            None => (base, 0.0),
            Some(matrix) => {
                let anchor_point = matrix.apply(base);
                let probe = matrix.apply(point(base.x + PROBE_OFFSET, base.y));
                (anchor_point, baseline_angle(probe - anchor_point))
            }
        };

        tracing::debug!(
            element = %doc.describe(id),
            x = position.x,
            y = position.y,
            rotation = rotation_degrees,
            ?anchor,
            "resolved text"
        );

        Ok(ResolvedText {
            text,
            x: position.x,
            y: position.y,
            rotation_degrees,
            anchor,
        })
    }

    /// The innermost explicit `x`/`y` per axis, looking no further out than the enclosing
    /// `<text>`.
    fn base_point(&mut self, id: NodeId) -> Point {
        let mut x = None;
        let mut y = None;
        let doc = self.doc;
        for ancestor in doc.ancestors(id) {
            if !doc.is_text_element(ancestor) {
                break;
            }
            if x.is_none() {
                x = self.coordinate(ancestor, "x");
            }
            if y.is_none() {
                y = self.coordinate(ancestor, "y");
            }
            if x.is_some() && y.is_some() {
                break;
            }
        }
        point(x.unwrap_or(0.0), y.unwrap_or(0.0))
    }

    fn coordinate(&mut self, id: NodeId, attribute: &'static str) -> Option<f64> {
        let doc = self.doc;
        let raw = doc.attribute(id, attribute)?;
        let first_report = self.reported.insert((id, attribute));
        match length::first_coordinate(raw) {
            Ok(None) => None,
            Ok(Some(coordinate)) => {
                if !coordinate.user_units && first_report {
                    report(
                        &mut self.warnings,
                        Warning::UnsupportedUnit {
                            element: doc.describe(id),
                            attribute,
                            value: raw.to_string(),
                        },
                    );
                }
                Some(coordinate.value)
            }
            Err(err) => {
                if first_report {
                    report(
                        &mut self.warnings,
                        Warning::InvalidCoordinate {
                            element: doc.describe(id),
                            attribute,
                            value: raw.to_string(),
                            message: err.to_string(),
                        },
                    );
                }
                None
            }
        }
    }

    /// Matrices contributed by `id` itself, in source order.
    fn local_transform(&mut self, id: NodeId) -> Result<&[AffineMatrix]> {
        if !self.transforms.contains_key(&id) {
            let matrices = self.compile_local_transform(id)?;
            self.transforms.insert(id, matrices);
        }
        Ok(self.transforms.get(&id).map(Vec::as_slice).unwrap_or_default())
    }

    fn compile_local_transform(&mut self, id: NodeId) -> Result<Vec<AffineMatrix>> {
        let doc = self.doc;
        let mut matrices = Vec::new();
        if let Some(raw) = doc.attribute(id, "transform") {
            let compiled = compile_transform_list(raw, self.options.transform_policy)?;
            for issue in compiled.issues {
                report(
                    &mut self.warnings,
                    Warning::Transform {
                        element: doc.describe(id),
                        issue,
                    },
                );
            }
            matrices = compiled.matrices;
        }

        // `<use x y>` places the referenced content with an extra translation applied after
        // the element's own transform.
        if doc.is_svg_element(id, "use") {
            let x = self.coordinate(id, "x").unwrap_or(0.0);
            let y = self.coordinate(id, "y").unwrap_or(0.0);
            if x != 0.0 || y != 0.0 {
                matrices.push(AffineMatrix::translate(x, y));
            }
        }
        Ok(matrices)
    }
}

/// Angle of a transformed horizontal probe. A probe that ends up vertical reads as 90°.
fn baseline_angle(direction: Vector) -> f64 {
    if direction.x == 0.0 {
        90.0
    } else {
        (direction.y / direction.x).atan().to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformPolicy;

    fn extract(svg: &str) -> Extraction {
        let doc = Document::parse(svg).expect("parse");
        extract_texts(&doc, &ExtractOptions::default()).expect("extract")
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn untransformed_text_uses_defaults() {
        let out = extract(r#"<svg xmlns="http://www.w3.org/2000/svg"><text>plain</text></svg>"#);
        assert_eq!(
            out.texts,
            vec![ResolvedText {
                text: "plain".to_string(),
                x: 0.0,
                y: 0.0,
                rotation_degrees: 0.0,
                anchor: Anchor::Start,
            }]
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn quarter_turn_on_ancestor() {
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g transform="rotate(90,0,0)"><text x="10" y="0">v</text></g></svg>"#,
        );
        let t = &out.texts[0];
        assert!(close(t.x, 0.0), "x = {}", t.x);
        assert!(close(t.y, 10.0), "y = {}", t.y);
        assert!(close(t.rotation_degrees, 90.0), "rotation = {}", t.rotation_degrees);
    }

    #[test]
    fn exactly_vertical_probe_reads_as_ninety_degrees() {
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text transform="matrix(0,1,-1,0,0,0)" x="3">v</text></svg>"#,
        );
        assert_eq!(out.texts[0].rotation_degrees, 90.0);
        assert_eq!((out.texts[0].x, out.texts[0].y), (0.0, 3.0));
    }

    #[test]
    fn local_transform_applies_before_ancestor_transform() {
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g transform="translate(100,0)"><text transform="scale(2)" x="1" y="1">a</text></g></svg>"#,
        );
        let t = &out.texts[0];
        assert!(close(t.x, 102.0) && close(t.y, 2.0), "{t:?}");
        assert!(close(t.rotation_degrees, 0.0));
    }

    #[test]
    fn rotation_is_measured_from_the_probe_not_the_matrix() {
        // Non-uniform scale bends a 45° rotation to atan(2).
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g transform="scale(1,2)"><text transform="rotate(45)">a</text></g></svg>"#,
        );
        let expected = 2f64.atan().to_degrees();
        assert!(
            close(out.texts[0].rotation_degrees, expected),
            "{} != {expected}",
            out.texts[0].rotation_degrees
        );
    }

    #[test]
    fn innermost_coordinates_win_per_axis() {
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text x="1" y="2"><tspan x="5">a</tspan><tspan y="9">b</tspan></text></svg>"#,
        );
        let points: Vec<(f64, f64)> = out.texts.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(points, vec![(5.0, 2.0), (1.0, 9.0)]);
    }

    #[test]
    fn coordinates_do_not_inherit_across_containers() {
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg" x="50" y="50"><g x="7" y="7"><text>a</text></g></svg>"#,
        );
        assert_eq!((out.texts[0].x, out.texts[0].y), (0.0, 0.0));
    }

    #[test]
    fn whitespace_only_and_empty_nodes_are_skipped() {
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text>   <tspan>kept</tspan></text><text/><text>
</text></svg>"#,
        );
        let texts: Vec<&str> = out.texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["kept"]);
    }

    #[test]
    fn output_follows_document_order() {
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text>one<tspan>two</tspan></text><g><text>three</text></g></svg>"#,
        );
        let texts: Vec<&str> = out.texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn defs_content_is_skipped_unless_requested() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><defs><text>hidden</text></defs><text>shown</text></svg>"#;
        let doc = Document::parse(svg).expect("parse");
        let default = extract_texts(&doc, &ExtractOptions::default()).expect("extract");
        assert_eq!(default.texts.len(), 1);

        let options = ExtractOptions {
            include_defs: true,
            ..ExtractOptions::default()
        };
        let all = extract_texts(&doc, &options).expect("extract");
        assert_eq!(all.texts.len(), 2);
    }

    #[test]
    fn malformed_transform_is_skipped_once_and_reported() {
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g transform="translate(5) bogus(1)"><text>a</text><text>b</text></g></svg>"#,
        );
        assert_eq!(out.texts.len(), 2);
        assert!(out.texts.iter().all(|t| close(t.x, 5.0)));
        assert_eq!(out.warnings.len(), 1);
        assert!(matches!(out.warnings[0], Warning::Transform { .. }));
    }

    #[test]
    fn strict_policy_rejects_malformed_transform() {
        let doc = Document::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text transform="rotate(1,2)">a</text></svg>"#,
        )
        .expect("parse");
        let options = ExtractOptions {
            transform_policy: TransformPolicy::Strict,
            ..ExtractOptions::default()
        };
        assert!(extract_texts(&doc, &options).is_err());
    }

    #[test]
    fn coordinate_lists_and_units() {
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text x="4 8 12" y="3mm">a</text><text x="oops" y="1">b</text></svg>"#,
        );
        assert_eq!((out.texts[0].x, out.texts[0].y), (4.0, 3.0));
        assert_eq!((out.texts[1].x, out.texts[1].y), (0.0, 1.0));
        assert!(matches!(
            out.warnings.as_slice(),
            [
                Warning::UnsupportedUnit { attribute: "y", .. },
                Warning::InvalidCoordinate { attribute: "x", .. }
            ]
        ));
    }

    #[test]
    fn blank_coordinates_are_absent_without_warning() {
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text x="  " y="3">a</text><text x="6" y="2"><tspan x="" y=" ">b</tspan></text></svg>"#,
        );
        assert_eq!((out.texts[0].x, out.texts[0].y), (0.0, 3.0));
        assert_eq!((out.texts[1].x, out.texts[1].y), (6.0, 2.0));
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    }

    #[test]
    fn skew_contributes_only_through_the_baseline_angle() {
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text transform="skewY(45)" x="0" y="0">a</text></svg>"#,
        );
        assert!(close(out.texts[0].rotation_degrees, 45.0));
        let out = extract(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text transform="skewX(45)" x="0" y="0">a</text></svg>"#,
        );
        assert!(close(out.texts[0].rotation_degrees, 0.0));
    }
}
