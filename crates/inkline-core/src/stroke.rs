//! Freehand strokes: raw input points plus the smoothed, width-varying
//! representation handed to renderers.

use crate::geometry::{Color, Point2D};
use crate::style::StrokeStyle;
use kurbo::{BezPath, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for strokes.
pub type StrokeId = Uuid;

/// Smallest base width a stroke can carry.
pub const MIN_STROKE_WIDTH: f64 = 0.1;

/// Scale applied to speed (canvas units per time unit) before inverting it.
const SPEED_SCALE: f64 = 0.01;
/// Bounds of the dynamic width multiplier.
const MIN_SPEED_FACTOR: f64 = 0.1;
const MAX_SPEED_FACTOR: f64 = 2.0;
/// Multiplier used when no speed can be derived.
const NEUTRAL_SPEED_FACTOR: f64 = 1.0;

/// A single sampled input point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub position: Point2D,
    /// Pen pressure, 1.0 for devices without pressure.
    pub pressure: f64,
    /// Input time. Expected to be non-decreasing, but not relied upon.
    pub timestamp: f64,
}

impl StrokePoint {
    pub fn new(position: Point2D, pressure: f64, timestamp: f64) -> Self {
        Self {
            position,
            pressure,
            timestamp,
        }
    }

    /// Full-pressure point at time zero.
    pub fn at(position: Point2D) -> Self {
        Self::new(position, 1.0, 0.0)
    }
}

impl Default for StrokePoint {
    fn default() -> Self {
        Self::at(Point2D::ZERO)
    }
}

/// One renderable piece of a stroke between two consecutive processed points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSegment {
    pub start: Point2D,
    pub end: Point2D,
    pub start_width: f64,
    pub end_width: f64,
}

impl StrokeSegment {
    /// Length of the segment.
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Unit normal to the left of the travel direction, zero for a
    /// degenerate segment.
    pub fn normal(&self) -> Vec2 {
        let dir = self.end - self.start;
        let len = dir.hypot();
        if len < f64::EPSILON {
            return Vec2::ZERO;
        }
        Vec2::new(-dir.y, dir.x) / len
    }

    /// Ribbon corners in triangle-strip order:
    /// start-left, start-right, end-left, end-right.
    pub fn quad(&self) -> [Point2D; 4] {
        let normal = self.normal();
        let start_offset = normal * (self.start_width * 0.5);
        let end_offset = normal * (self.end_width * 0.5);
        [
            self.start + start_offset,
            self.start - start_offset,
            self.end + end_offset,
            self.end - end_offset,
        ]
    }
}

/// A freehand stroke.
///
/// Raw points are append-only. Processed points are rebuilt from scratch
/// whenever the raw points or the smoothing configuration change, and always
/// have the same length as the raw points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StrokeRecord")]
pub struct Stroke {
    id: StrokeId,
    raw_points: Vec<StrokePoint>,
    #[serde(skip_serializing)]
    processed_points: Vec<StrokePoint>,
    color: Color,
    base_width: f64,
    dynamic_width: bool,
    smoothing: usize,
}

impl Stroke {
    /// Create an empty stroke with static width and no smoothing.
    pub fn new(color: Color, base_width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_points: Vec::new(),
            processed_points: Vec::new(),
            color,
            base_width: base_width.max(MIN_STROKE_WIDTH),
            dynamic_width: false,
            smoothing: 0,
        }
    }

    /// Create an empty stroke capturing every setting of `style`.
    pub fn from_style(style: &StrokeStyle) -> Self {
        let mut stroke = Self::new(style.color, style.width);
        stroke.dynamic_width = style.dynamic_width;
        stroke.smoothing = style.smoothing;
        stroke
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    /// Append an input point and rebuild the processed points.
    pub fn add_point(&mut self, point: StrokePoint) {
        log::trace!(
            "stroke {}: point ({:.1}, {:.1}) p={:.2} t={:.3}",
            self.id,
            point.position.x,
            point.position.y,
            point.pressure,
            point.timestamp
        );
        self.raw_points.push(point);
        self.update_processed_points();
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn base_width(&self) -> f64 {
        self.base_width
    }

    pub fn set_base_width(&mut self, width: f64) {
        self.base_width = width.max(MIN_STROKE_WIDTH);
    }

    pub fn dynamic_width(&self) -> bool {
        self.dynamic_width
    }

    pub fn set_dynamic_width(&mut self, dynamic: bool) {
        self.dynamic_width = dynamic;
        self.update_processed_points();
    }

    pub fn smoothing(&self) -> usize {
        self.smoothing
    }

    /// Set the smoothing radius. Negative levels clamp to zero.
    pub fn set_smoothing(&mut self, level: i32) {
        self.smoothing = usize::try_from(level).unwrap_or(0);
        self.update_processed_points();
    }

    pub fn raw_points(&self) -> &[StrokePoint] {
        &self.raw_points
    }

    pub fn processed_points(&self) -> &[StrokePoint] {
        &self.processed_points
    }

    pub fn len(&self) -> usize {
        self.raw_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_points.is_empty()
    }

    /// Rendered width at a processed point.
    ///
    /// Out-of-range indices return the base width. With dynamic width on,
    /// faster motion into the point gives a thinner line, bounded to
    /// `[0.1, 2.0]` times the base width before pressure is applied.
    pub fn width_at(&self, index: usize) -> f64 {
        let Some(point) = self.processed_points.get(index) else {
            return self.base_width;
        };

        if self.dynamic_width {
            self.base_width * self.speed_factor(index) * point.pressure
        } else {
            self.base_width * point.pressure
        }
    }

    /// Width multiplier derived from the motion between `index - 1` and `index`.
    fn speed_factor(&self, index: usize) -> f64 {
        if index == 0 {
            return NEUTRAL_SPEED_FACTOR;
        }
        let prev = &self.processed_points[index - 1];
        let current = &self.processed_points[index];

        // Non-increasing timestamps carry no usable speed.
        let elapsed = current.timestamp - prev.timestamp;
        if elapsed.is_nan() || elapsed <= 0.0 {
            return NEUTRAL_SPEED_FACTOR;
        }

        let speed = prev.position.distance(current.position) / elapsed;
        (1.0 / (speed * SPEED_SCALE)).clamp(MIN_SPEED_FACTOR, MAX_SPEED_FACTOR)
    }

    /// Segments between consecutive processed points, with their widths.
    pub fn segments(&self) -> impl Iterator<Item = StrokeSegment> + '_ {
        self.processed_points
            .windows(2)
            .enumerate()
            .map(|(i, pair)| StrokeSegment {
                start: pair[0].position,
                end: pair[1].position,
                start_width: self.width_at(i),
                end_width: self.width_at(i + 1),
            })
    }

    /// Bounding box of the processed points.
    pub fn bounds(&self) -> Rect {
        let mut points = self.processed_points.iter().map(|p| p.position);
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p))
    }

    /// Centerline polyline through the processed points.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.processed_points.iter().map(|p| p.position);

        if let Some(first) = points.next() {
            path.move_to(first);
            for point in points {
                path.line_to(point);
            }
        }

        path
    }

    fn update_processed_points(&mut self) {
        self.processed_points = smooth_points(&self.raw_points, self.smoothing);
    }
}

/// Triangular-weighted moving average over a window of `radius` points on
/// each side. Endpoints and timestamps pass through unchanged.
fn smooth_points(raw: &[StrokePoint], radius: usize) -> Vec<StrokePoint> {
    if radius == 0 || raw.len() < 3 {
        return raw.to_vec();
    }

    let last = raw.len() - 1;
    let falloff = (radius + 1) as f64;

    raw.iter()
        .enumerate()
        .map(|(i, point)| {
            if i == 0 || i == last {
                return *point;
            }

            let start = i.saturating_sub(radius);
            let end = (i + radius).min(last);

            let mut position = Vec2::ZERO;
            let mut pressure = 0.0;
            let mut total_weight = 0.0;
            for (j, sample) in raw.iter().enumerate().take(end + 1).skip(start) {
                let weight = 1.0 - j.abs_diff(i) as f64 / falloff;
                position += sample.position.to_vec2() * weight;
                pressure += sample.pressure * weight;
                total_weight += weight;
            }

            // The center sample always has weight 1.
            StrokePoint {
                position: (position / total_weight).to_point(),
                pressure: pressure / total_weight,
                timestamp: point.timestamp,
            }
        })
        .collect()
}

/// Serialized form of a stroke; processed points are derived on load.
#[derive(Deserialize)]
struct StrokeRecord {
    id: StrokeId,
    raw_points: Vec<StrokePoint>,
    color: Color,
    base_width: f64,
    dynamic_width: bool,
    smoothing: usize,
}

impl From<StrokeRecord> for Stroke {
    fn from(record: StrokeRecord) -> Self {
        let mut stroke = Self {
            id: record.id,
            raw_points: record.raw_points,
            processed_points: Vec::new(),
            color: record.color,
            base_width: record.base_width.max(MIN_STROKE_WIDTH),
            dynamic_width: record.dynamic_width,
            smoothing: record.smoothing,
        };
        stroke.update_processed_points();
        stroke
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64, pressure: f64, timestamp: f64) -> StrokePoint {
        StrokePoint::new(Point2D::new(x, y), pressure, timestamp)
    }

    /// A wobbly stroke with varying pressure and strictly increasing time.
    fn wobbly_stroke(smoothing: i32, count: usize) -> Stroke {
        let mut stroke = Stroke::new(Color::BLACK, 4.0);
        stroke.set_smoothing(smoothing);
        for i in 0..count {
            let t = i as f64;
            let y = if i % 2 == 0 { 0.0 } else { 5.0 + t };
            stroke.add_point(point(t * 3.0, y, 0.5 + (i % 3) as f64 * 0.25, t * 0.5));
        }
        stroke
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_stroke_creation() {
        let stroke = Stroke::new(Color::RED, 3.0);
        assert!(stroke.is_empty());
        assert!(stroke.processed_points().is_empty());
        assert_eq!(stroke.color(), Color::RED);
        assert_close(stroke.base_width(), 3.0);
        assert!(!stroke.dynamic_width());
        assert_eq!(stroke.smoothing(), 0);
    }

    #[test]
    fn test_from_style_captures_settings() {
        let style = StrokeStyle {
            color: Color::BLUE,
            width: 6.0,
            dynamic_width: true,
            smoothing: 3,
        };
        let stroke = Stroke::from_style(&style);
        assert_eq!(stroke.color(), Color::BLUE);
        assert_close(stroke.base_width(), 6.0);
        assert!(stroke.dynamic_width());
        assert_eq!(stroke.smoothing(), 3);
    }

    #[test]
    fn test_processed_length_matches_raw() {
        for smoothing in 0..6 {
            for count in 0..12 {
                let stroke = wobbly_stroke(smoothing, count);
                assert_eq!(stroke.raw_points().len(), count);
                assert_eq!(stroke.processed_points().len(), count);
            }
        }
    }

    #[test]
    fn test_no_smoothing_is_identity() {
        let stroke = wobbly_stroke(0, 9);
        assert_eq!(stroke.processed_points(), stroke.raw_points());
    }

    #[test]
    fn test_smoothing_anchors_endpoints() {
        for smoothing in 1..6 {
            let stroke = wobbly_stroke(smoothing, 10);
            let raw = stroke.raw_points();
            let processed = stroke.processed_points();
            assert_eq!(processed.first(), raw.first());
            assert_eq!(processed.last(), raw.last());
        }
    }

    #[test]
    fn test_smoothing_weighted_average() {
        let mut stroke = Stroke::new(Color::BLACK, 1.0);
        stroke.set_smoothing(1);
        stroke.add_point(point(0.0, 0.0, 1.0, 0.0));
        stroke.add_point(point(10.0, 10.0, 0.5, 1.0));
        stroke.add_point(point(20.0, 0.0, 1.0, 2.0));

        // Weights 0.5, 1.0, 0.5 around the middle point.
        let middle = stroke.processed_points()[1];
        assert_close(middle.position.x, 10.0);
        assert_close(middle.position.y, 5.0);
        assert_close(middle.pressure, 0.75);
        assert_close(middle.timestamp, 1.0);
    }

    #[test]
    fn test_smoothing_window_clamped_to_bounds() {
        let mut stroke = Stroke::new(Color::BLACK, 1.0);
        stroke.set_smoothing(5);
        for (i, x) in [0.0, 4.0, 8.0, 30.0].into_iter().enumerate() {
            stroke.add_point(point(x, 0.0, 1.0, i as f64));
        }

        // Window for index 1 covers every point: weights 5/6, 1, 5/6, 4/6.
        let expected = (0.0 * 5.0 + 4.0 * 6.0 + 8.0 * 5.0 + 30.0 * 4.0) / 20.0;
        assert_close(stroke.processed_points()[1].position.x, expected);
    }

    #[test]
    fn test_negative_smoothing_clamps_to_zero() {
        let mut stroke = wobbly_stroke(3, 6);
        stroke.set_smoothing(-4);
        assert_eq!(stroke.smoothing(), 0);
        assert_eq!(stroke.processed_points(), stroke.raw_points());
    }

    #[test]
    fn test_reconfiguring_recomputes() {
        let mut stroke = wobbly_stroke(0, 6);
        let before = stroke.processed_points().to_vec();
        stroke.set_smoothing(2);
        assert_ne!(stroke.processed_points(), before.as_slice());
        stroke.set_smoothing(0);
        assert_eq!(stroke.processed_points(), before.as_slice());
    }

    fn straight_stroke(dynamic_width: bool) -> Stroke {
        let mut stroke = Stroke::new(Color::BLACK, 4.0);
        stroke.set_dynamic_width(dynamic_width);
        stroke.add_point(point(0.0, 0.0, 1.0, 0.0));
        stroke.add_point(point(10.0, 0.0, 1.0, 1.0));
        stroke.add_point(point(20.0, 0.0, 1.0, 2.0));
        stroke
    }

    #[test]
    fn test_static_width() {
        let stroke = straight_stroke(false);
        assert_close(stroke.width_at(1), 4.0);
    }

    #[test]
    fn test_static_width_scales_with_pressure() {
        let mut stroke = Stroke::new(Color::BLACK, 4.0);
        stroke.add_point(point(0.0, 0.0, 0.25, 0.0));
        assert_close(stroke.width_at(0), 1.0);
    }

    #[test]
    fn test_dynamic_width_slow_motion_clamps_to_max() {
        // 10 units over 1 time unit: 1 / (10 * 0.01) = 10, clamped to 2.
        let stroke = straight_stroke(true);
        assert_close(stroke.width_at(1), 8.0);
    }

    #[test]
    fn test_dynamic_width_fast_motion_thins() {
        let mut stroke = Stroke::new(Color::BLACK, 4.0);
        stroke.set_dynamic_width(true);
        stroke.add_point(point(0.0, 0.0, 1.0, 0.0));
        stroke.add_point(point(200.0, 0.0, 1.0, 1.0));
        // Speed 200: multiplier 0.5.
        assert_close(stroke.width_at(1), 2.0);

        stroke.add_point(point(5200.0, 0.0, 1.0, 2.0));
        // Speed 5000: multiplier 0.02, clamped to 0.1.
        assert_close(stroke.width_at(2), 0.4);
    }

    #[test]
    fn test_dynamic_width_first_point_is_neutral() {
        let stroke = straight_stroke(true);
        assert_close(stroke.width_at(0), 4.0);
    }

    #[test]
    fn test_dynamic_width_degenerate_timestamps() {
        let mut stroke = Stroke::new(Color::BLACK, 4.0);
        stroke.set_dynamic_width(true);
        stroke.add_point(point(0.0, 0.0, 1.0, 5.0));
        stroke.add_point(point(10.0, 0.0, 1.0, 5.0));
        stroke.add_point(point(20.0, 0.0, 1.0, 3.0));

        assert_close(stroke.width_at(1), 4.0);
        assert_close(stroke.width_at(2), 4.0);
    }

    #[test]
    fn test_dynamic_width_stationary_point() {
        let mut stroke = Stroke::new(Color::BLACK, 4.0);
        stroke.set_dynamic_width(true);
        stroke.add_point(point(3.0, 3.0, 1.0, 0.0));
        stroke.add_point(point(3.0, 3.0, 1.0, 1.0));
        assert_close(stroke.width_at(1), 8.0);
    }

    #[test]
    fn test_width_out_of_range() {
        let stroke = straight_stroke(true);
        assert_close(stroke.width_at(3), 4.0);
        assert_close(Stroke::new(Color::BLACK, 2.5).width_at(0), 2.5);
    }

    #[test]
    fn test_dynamic_width_bounds() {
        for smoothing in 0..4 {
            let mut stroke = wobbly_stroke(smoothing, 20);
            stroke.set_dynamic_width(true);

            let pressures = stroke.processed_points().iter().map(|p| p.pressure);
            let min_pressure = pressures.clone().fold(f64::INFINITY, f64::min);
            let max_pressure = pressures.fold(f64::NEG_INFINITY, f64::max);
            let lower = stroke.base_width() * MIN_SPEED_FACTOR * min_pressure;
            let upper = stroke.base_width() * MAX_SPEED_FACTOR * max_pressure;

            for i in 0..stroke.len() {
                let width = stroke.width_at(i);
                assert!(width >= lower - 1e-9 && width <= upper + 1e-9);
            }
        }
    }

    #[test]
    fn test_base_width_floor() {
        let mut stroke = Stroke::new(Color::BLACK, 0.0);
        assert_close(stroke.base_width(), MIN_STROKE_WIDTH);
        stroke.set_base_width(-3.0);
        assert_close(stroke.base_width(), MIN_STROKE_WIDTH);
    }

    #[test]
    fn test_segments() {
        let stroke = straight_stroke(true);
        let segments: Vec<_> = stroke.segments().collect();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, Point2D::new(0.0, 0.0));
        assert_eq!(segments[0].end, Point2D::new(10.0, 0.0));
        assert_close(segments[0].start_width, 4.0);
        assert_close(segments[0].end_width, 8.0);
        assert_close(segments[1].length(), 10.0);
    }

    #[test]
    fn test_segment_quad() {
        let segment = StrokeSegment {
            start: Point2D::new(0.0, 0.0),
            end: Point2D::new(10.0, 0.0),
            start_width: 2.0,
            end_width: 4.0,
        };
        let [a, b, c, d] = segment.quad();
        assert_eq!(a, Point2D::new(0.0, 1.0));
        assert_eq!(b, Point2D::new(0.0, -1.0));
        assert_eq!(c, Point2D::new(10.0, 2.0));
        assert_eq!(d, Point2D::new(10.0, -2.0));
    }

    #[test]
    fn test_degenerate_segment_quad() {
        let segment = StrokeSegment {
            start: Point2D::new(5.0, 5.0),
            end: Point2D::new(5.0, 5.0),
            start_width: 2.0,
            end_width: 2.0,
        };
        assert_eq!(segment.normal(), Vec2::ZERO);
        assert!(segment.quad().iter().all(|p| *p == Point2D::new(5.0, 5.0)));
    }

    #[test]
    fn test_bounds_and_path() {
        assert_eq!(Stroke::new(Color::BLACK, 1.0).bounds(), Rect::ZERO);

        let stroke = wobbly_stroke(0, 4);
        let bounds = stroke.bounds();
        assert_close(bounds.x0, 0.0);
        assert_close(bounds.x1, 9.0);
        assert_close(bounds.y0, 0.0);
        assert_close(bounds.y1, 8.0);

        assert_eq!(stroke.to_path().elements().len(), 4);
    }

    #[test]
    fn test_serde_rebuilds_processed_points() {
        let stroke = wobbly_stroke(2, 8);
        let json = serde_json::to_string(&stroke).unwrap();
        assert!(!json.contains("processed_points"));

        let loaded: Stroke = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, stroke);
    }
}
