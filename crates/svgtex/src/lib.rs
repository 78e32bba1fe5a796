#![forbid(unsafe_code)]

//! `svgtex` places the text of an SVG drawing into a LaTeX `picture` environment, so labels are
//! typeset by LaTeX on top of the graphic.
//!
//! # Features
//!
//! - `render`: enable LaTeX output (`svgtex::render`)

pub use svgtex_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use svgtex_render::{PictureOptions, UNIT_LENGTH_MM, render_picture};

    use svgtex_core::{ExtractOptions, ResolvedText, Result, SvgTexConfig, Warning};

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct ConvertOptions {
        pub extract: ExtractOptions,
        pub picture: PictureOptions,
        /// Also produce the drawing with its text removed.
        pub textless: bool,
    }

    impl ConvertOptions {
        pub fn from_config(config: &SvgTexConfig) -> Self {
            Self {
                extract: config.extract_options(),
                picture: PictureOptions::from_config(config),
                textless: false,
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Conversion {
        /// The LaTeX `picture` environment.
        pub picture: String,
        pub texts: Vec<ResolvedText>,
        pub warnings: Vec<Warning>,
        pub textless_svg: Option<String>,
    }

    /// Parses `svg` and renders its text as a LaTeX picture in one call.
    pub fn convert(svg: &str, options: &ConvertOptions) -> Result<Conversion> {
        let prepared = svgtex_core::prepare(svg)?;
        let extraction = prepared.extract(&options.extract)?;
        let picture = render_picture(&extraction.texts, prepared.dimensions, &options.picture);
        let textless_svg = options.textless.then(|| prepared.textless_svg());
        Ok(Conversion {
            picture,
            texts: extraction.texts,
            warnings: extraction.warnings,
            textless_svg,
        })
    }
}
