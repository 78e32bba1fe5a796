//! Affine matrix algebra for SVG user space.

use crate::geom::{Point, point};
use std::ops::Mul;

/// A 2D affine transform in homogeneous coordinates.
///
/// Stored in the same form as SVG's `matrix(a b c d e f)`:
///
/// ```text
/// [a c e]
/// [b d f]
/// [0 0 1]
/// ```
///
/// Only the six free coefficients are kept, so the bottom row is `[0 0 1]` for every value of
/// this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMatrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineMatrix {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation about the origin; positive angles turn +x towards +y (clockwise on screen).
    pub fn rotate(angle_deg: f64) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    pub fn skew_x(angle_deg: f64) -> Self {
        Self::new(1.0, 0.0, angle_deg.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(angle_deg: f64) -> Self {
        Self::new(1.0, angle_deg.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// The full 3×3 grid, row-major.
    pub fn rows(&self) -> [[f64; 3]; 3] {
        [
            [self.a, self.c, self.e],
            [self.b, self.d, self.f],
            [0.0, 0.0, 1.0],
        ]
    }

    /// Matrix product `self · rhs`: the result applies `rhs` first, then `self`.
    pub fn multiply(&self, rhs: &Self) -> Self {
        Self {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            e: self.a * rhs.e + self.c * rhs.f + self.e,
            f: self.b * rhs.e + self.d * rhs.f + self.f,
        }
    }

    /// Maps a point (implicit `w = 1`).
    pub fn apply(&self, p: Point) -> Point {
        point(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }
}

impl Mul for AffineMatrix {
    type Output = AffineMatrix;

    fn mul(self, rhs: AffineMatrix) -> AffineMatrix {
        self.multiply(&rhs)
    }
}

/// Collapses a transform stack into a single matrix.
///
/// `stack` is ordered outermost first (`[M_root, ..., M_local]`). The two trailing matrices are
/// multiplied until one remains, so the result is `M_root · ... · M_local` and applying it is the
/// same as applying `M_local` first and `M_root` last.
///
/// Returns `None` for an empty stack.
pub fn compose(stack: &[AffineMatrix]) -> Option<AffineMatrix> {
    stack.iter().rev().copied().reduce(|inner, outer| outer * inner)
}
