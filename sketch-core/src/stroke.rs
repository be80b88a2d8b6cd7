//! Timed pen strokes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Point;

/// Identity of a stroke.
///
/// Clones of a stroke share its identity; every filter output gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrokeId(Uuid);

impl StrokeId {
    /// Create a new unique stroke ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StrokeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StrokeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One pen sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedPoint {
    /// X position in canvas coordinates.
    pub x: f64,
    /// Y position in canvas coordinates.
    pub y: f64,
    /// Timestamp in milliseconds.
    pub t: u64,
}

impl TimedPoint {
    /// Create a new sample.
    #[must_use]
    pub const fn new(x: f64, y: f64, t: u64) -> Self {
        Self { x, y, t }
    }

    /// Position without the timestamp.
    #[must_use]
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether two samples sit at the same position.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn same_position(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

/// Axis-aligned bounding box of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum X.
    pub min_x: f64,
    /// Minimum Y.
    pub min_y: f64,
    /// Maximum X.
    pub max_x: f64,
    /// Maximum Y.
    pub max_y: f64,
}

impl Bounds {
    /// Width of the box.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the box.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Smallest box containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// An ordered, append-only sequence of timed samples from one pen-down to pen-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    id: StrokeId,
    points: Vec<TimedPoint>,
}

impl Stroke {
    /// Create an empty stroke with a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self::from_points(Vec::new())
    }

    /// Create a stroke from samples.
    #[must_use]
    pub fn from_points(points: Vec<TimedPoint>) -> Self {
        Self {
            id: StrokeId::new(),
            points,
        }
    }

    /// Create a stroke from `(x, y, t)` triples.
    #[must_use]
    pub fn from_triples(triples: &[(f64, f64, u64)]) -> Self {
        Self::from_points(
            triples
                .iter()
                .map(|&(x, y, t)| TimedPoint::new(x, y, t))
                .collect(),
        )
    }

    /// Identity of this stroke.
    #[must_use]
    pub const fn id(&self) -> StrokeId {
        self.id
    }

    /// Append a sample.
    pub fn push(&mut self, point: TimedPoint) {
        self.points.push(point);
    }

    /// Number of samples.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Whether the stroke has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sample at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TimedPoint> {
        self.points.get(index)
    }

    /// All samples in order.
    #[must_use]
    pub fn points(&self) -> &[TimedPoint] {
        &self.points
    }

    /// Positions of all samples in order.
    #[must_use]
    pub fn positions(&self) -> Vec<Point> {
        self.points.iter().map(TimedPoint::point).collect()
    }

    /// First sample.
    #[must_use]
    pub fn first(&self) -> Option<&TimedPoint> {
        self.points.first()
    }

    /// Last sample.
    #[must_use]
    pub fn last(&self) -> Option<&TimedPoint> {
        self.points.last()
    }

    /// Total arclength.
    #[must_use]
    pub fn path_length(&self) -> f64 {
        crate::geometry::path_length(self.points.iter().map(TimedPoint::point))
    }

    /// Bounding box, or `None` for an empty stroke.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.points.first()?;
        let init = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(self.points.iter().fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<TimedPoint> for Stroke {
    fn from_iter<I: IntoIterator<Item = TimedPoint>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}
