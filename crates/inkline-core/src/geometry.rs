//! Geometry and color primitives shared by strokes and renderers.

use serde::{Deserialize, Serialize};

/// A 2D position in canvas coordinates.
///
/// Vector arithmetic goes through [`kurbo::Vec2`]: `a - b` yields a `Vec2`,
/// `p + v` offsets a point, and [`Point2D::distance`] is the Euclidean distance.
pub type Point2D = kurbo::Point;

/// Linear RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Preset palette bound to the host's color keys.
    pub const RED: Self = Self::rgb(0.8, 0.2, 0.2);
    pub const GREEN: Self = Self::rgb(0.2, 0.8, 0.2);
    pub const BLUE: Self = Self::rgb(0.2, 0.2, 0.8);
    pub const DARK: Self = Self::rgb(0.2, 0.2, 0.2);
    pub const LIGHT: Self = Self::rgb(0.8, 0.8, 0.8);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<Color> for peniko::Color {
    fn from(color: Color) -> Self {
        peniko::Color::new([color.r, color.g, color.b, color.a])
    }
}

impl From<peniko::Color> for Color {
    fn from(color: peniko::Color) -> Self {
        let [r, g, b, a] = color.components;
        Self { r, g, b, a }
    }
}
