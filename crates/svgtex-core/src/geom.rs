#![forbid(unsafe_code)]

/// SVG user space: the coordinate system of `x`/`y` attributes before any `transform` applies,
/// and of the root `width`/`height` after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSpace {}

pub type Point = euclid::Point2D<f64, UserSpace>;
pub type Vector = euclid::Vector2D<f64, UserSpace>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}
