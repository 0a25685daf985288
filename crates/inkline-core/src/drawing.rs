//! The drawing: every stroke, the current style and the undo history.

use crate::command::{Command, History, StrokeStore};
use crate::geometry::{Color, Point2D};
use crate::stroke::{Stroke, StrokeId, StrokePoint};
use crate::style::StrokeStyle;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A drawing made of freehand strokes.
///
/// Input drives [`begin_stroke`](Self::begin_stroke),
/// [`continue_stroke`](Self::continue_stroke) and
/// [`end_stroke`](Self::end_stroke). Stroke creation and clearing are
/// recorded in the history; continuation points and style changes are not.
///
/// The drawing is not synchronized. Hosts that read strokes from another
/// thread must wrap it in their own lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drawing {
    /// Unique drawing identifier.
    pub id: String,
    /// Drawing name.
    pub name: String,
    /// All strokes, oldest first.
    strokes: StrokeStore,
    /// Style given to strokes created by `begin_stroke`.
    #[serde(default)]
    style: StrokeStyle,
    #[serde(skip)]
    history: History,
    /// Stroke receiving continuation points.
    #[serde(skip)]
    active: Option<StrokeId>,
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawing {
    /// Create a new empty drawing.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            strokes: StrokeStore::new(),
            style: StrokeStyle::default(),
            history: History::new(),
            active: None,
        }
    }

    /// Start a stroke with the current style and make it active.
    pub fn begin_stroke(&mut self, position: Point2D, pressure: f64, timestamp: f64) -> StrokeId {
        let style = self.style;
        self.begin_stroke_with(&style, position, pressure, timestamp)
    }

    /// Start a stroke with an explicit style and make it active.
    pub fn begin_stroke_with(
        &mut self,
        style: &StrokeStyle,
        position: Point2D,
        pressure: f64,
        timestamp: f64,
    ) -> StrokeId {
        let mut stroke = Stroke::from_style(&style.sanitized());
        stroke.add_point(StrokePoint::new(position, pressure, timestamp));
        let id = stroke.id();

        self.history
            .execute(Command::add_stroke(stroke), &mut self.strokes);
        self.active = Some(id);
        id
    }

    /// Append a point to the active stroke. Does nothing without one.
    pub fn continue_stroke(&mut self, position: Point2D, pressure: f64, timestamp: f64) {
        let Some(id) = self.active else {
            return;
        };
        match self.strokes.get_mut(id) {
            Some(stroke) => stroke.add_point(StrokePoint::new(position, pressure, timestamp)),
            None => self.active = None,
        }
    }

    /// Stop sending points to the active stroke.
    pub fn end_stroke(&mut self) {
        self.active = None;
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// Replace the whole style, applying the setter clamps.
    pub fn set_style(&mut self, style: StrokeStyle) {
        self.style = style.sanitized();
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.color = color;
    }

    /// Set the width of future strokes, floor-clamped to 0.1.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.style.set_width(width);
    }

    pub fn set_dynamic_width(&mut self, enabled: bool) {
        self.style.dynamic_width = enabled;
    }

    /// Set the smoothing of future strokes. Negative levels clamp to zero.
    pub fn set_smoothing(&mut self, level: i32) {
        self.style.set_smoothing(level);
    }

    /// Remove every stroke as one undoable step. Does nothing when empty.
    pub fn clear_drawing(&mut self) {
        if self.strokes.is_empty() {
            return;
        }
        self.history.execute(Command::clear(), &mut self.strokes);
        self.active = None;
    }

    /// Undo the last stroke or clear.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        let performed = self.history.undo(&mut self.strokes);
        self.drop_stale_active();
        performed
    }

    /// Redo the last undone stroke or clear.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        let performed = self.history.redo(&mut self.strokes);
        self.drop_stale_active();
        performed
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of recorded commands, applied or undone.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Number of applied commands.
    pub fn history_cursor(&self) -> usize {
        self.history.cursor()
    }

    /// Forget the undo history, keeping the strokes.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn drop_stale_active(&mut self) {
        if self.active.is_some_and(|id| !self.strokes.contains(id)) {
            self.active = None;
        }
    }

    /// All strokes, oldest first.
    pub fn strokes(&self) -> &[Stroke] {
        self.strokes.as_slice()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter()
    }

    pub fn for_each_stroke(&self, mut callback: impl FnMut(&Stroke)) {
        for stroke in self.strokes.iter() {
            callback(stroke);
        }
    }

    pub fn stroke(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.get(id)
    }

    /// The stroke currently receiving points, if any.
    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.active.and_then(|id| self.strokes.get(id))
    }

    pub fn active_stroke_id(&self) -> Option<StrokeId> {
        self.active
    }

    pub fn last_stroke(&self) -> Option<&Stroke> {
        self.strokes.last()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Combined bounds of all strokes.
    pub fn bounds(&self) -> Option<Rect> {
        self.strokes
            .iter()
            .filter(|stroke| !stroke.is_empty())
            .map(Stroke::bounds)
            .reduce(|a, b| a.union(b))
    }

    /// Serialize strokes and style to JSON. History is not included.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON. The loaded drawing has an empty history.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut drawing: Self = serde_json::from_str(json)?;
        drawing.style = drawing.style.sanitized();
        Ok(drawing)
    }
}
