#![forbid(unsafe_code)]

//! LaTeX `picture` output for resolved SVG text.
//!
//! The generated environment needs the `graphicx` package when a background image is included
//! and the `rotating` package for `\turnbox`.

pub mod latex;

pub use latex::{PictureOptions, UNIT_LENGTH_MM, render_picture};
