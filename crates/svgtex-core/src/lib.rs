#![forbid(unsafe_code)]

//! SVG text placement for LaTeX overlays (headless).
//!
//! Reads an SVG document, expands `<use>` references, and resolves every `<text>`/`<tspan>` to a
//! position, baseline rotation and horizontal anchor in document coordinates, with all ancestor
//! transforms applied.

pub mod align;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod geom;
mod length;
pub mod matrix;
pub mod references;
pub mod textless;
pub mod transform;
pub mod warning;

pub use align::Anchor;
pub use config::SvgTexConfig;
pub use document::{Dimensions, Document, NodeId};
pub use error::{Error, Result};
pub use extract::{Extraction, ResolvedText, extract_texts};
pub use matrix::AffineMatrix;
pub use transform::TransformPolicy;
pub use warning::Warning;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub transform_policy: TransformPolicy,
    /// Also extract text that only lives inside `<defs>`.
    pub include_defs: bool,
}

impl ExtractOptions {
    /// Malformed transforms are errors.
    pub fn strict() -> Self {
        Self {
            transform_policy: TransformPolicy::Strict,
            include_defs: false,
        }
    }

    /// Malformed transform chunks are skipped and reported as warnings.
    pub fn lenient() -> Self {
        Self {
            transform_policy: TransformPolicy::Lenient,
            include_defs: false,
        }
    }
}

/// A parsed drawing with its references expanded, ready for extraction.
#[derive(Debug, Clone)]
pub struct PreparedSvg {
    /// The document as parsed.
    pub document: Document,
    /// The document after `<use>` expansion.
    pub resolved: Document,
    pub dimensions: Dimensions,
    /// Reference resolution warnings.
    pub warnings: Vec<Warning>,
}

impl PreparedSvg {
    /// Extraction warnings come after the reference warnings already collected.
    pub fn extract(&self, options: &ExtractOptions) -> Result<Extraction> {
        let mut extraction = extract_texts(&self.resolved, options)?;
        let mut warnings = self.warnings.clone();
        warnings.append(&mut extraction.warnings);
        extraction.warnings = warnings;
        Ok(extraction)
    }

    pub fn textless_svg(&self) -> String {
        textless::strip_text(&self.document)
    }
}

/// Parses `svg`, reads its root dimensions and expands its references.
pub fn prepare(svg: &str) -> Result<PreparedSvg> {
    let document = Document::parse(svg)?;
    let dimensions = document.dimensions()?;
    let mut resolved = document.clone();
    let warnings = references::resolve_references(&mut resolved);
    Ok(PreparedSvg {
        document,
        resolved,
        dimensions,
        warnings,
    })
}
