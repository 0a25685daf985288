//! Style applied to newly created strokes.

use crate::geometry::Color;
use crate::stroke::MIN_STROKE_WIDTH;
use serde::{Deserialize, Serialize};

/// Settings captured by a stroke when it is created.
///
/// Changing a style never affects strokes that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub color: Color,
    /// Base width, at least [`StrokeStyle::WIDTH_MIN`].
    pub width: f64,
    /// Derive width from pointer speed.
    pub dynamic_width: bool,
    /// Smoothing window radius in points; 0 disables smoothing.
    pub smoothing: usize,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: Self::WIDTH_DEFAULT,
            dynamic_width: false,
            smoothing: 0,
        }
    }
}

impl StrokeStyle {
    /// The min width
    pub const WIDTH_MIN: f64 = MIN_STROKE_WIDTH;
    /// The default width
    pub const WIDTH_DEFAULT: f64 = 2.0;
    /// Increment used by [`wider`](Self::wider) and [`narrower`](Self::narrower).
    pub const WIDTH_STEP: f64 = 0.5;
    /// Range the width steppers stay inside.
    pub const WIDTH_STEP_MIN: f64 = 0.5;
    pub const WIDTH_STEP_MAX: f64 = 50.0;
    /// Highest smoothing level reachable with [`smoother`](Self::smoother).
    pub const SMOOTHING_STEP_MAX: usize = 10;

    /// Set the width, floor-clamped to [`Self::WIDTH_MIN`].
    pub fn set_width(&mut self, width: f64) {
        self.width = width.max(Self::WIDTH_MIN);
    }

    /// Set the smoothing level. Negative levels clamp to zero.
    pub fn set_smoothing(&mut self, level: i32) {
        self.smoothing = usize::try_from(level).unwrap_or(0);
    }

    /// Style with the width floor applied.
    pub fn sanitized(self) -> Self {
        Self {
            width: self.width.max(Self::WIDTH_MIN),
            ..self
        }
    }

    pub fn wider(&mut self) {
        self.width = (self.width + Self::WIDTH_STEP).min(Self::WIDTH_STEP_MAX);
    }

    pub fn narrower(&mut self) {
        self.width = (self.width - Self::WIDTH_STEP).max(Self::WIDTH_STEP_MIN);
    }

    pub fn smoother(&mut self) {
        self.smoothing = (self.smoothing + 1).min(Self::SMOOTHING_STEP_MAX);
    }

    pub fn rougher(&mut self) {
        self.smoothing = self.smoothing.saturating_sub(1);
    }

    pub fn toggle_dynamic_width(&mut self) {
        self.dynamic_width = !self.dynamic_width;
    }
}
