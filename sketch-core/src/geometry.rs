//! Planar geometry primitives shared by filters and recognizers.

use serde::{Deserialize, Serialize};

/// Magnitudes at or below this are treated as zero-length.
pub const EPSILON: f64 = 1e-10;

/// A position or direction in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `other` to `self`.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Component-wise sum.
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Scale both components.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Length of the vector.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    #[must_use]
    pub fn normalize(self) -> Option<Self> {
        let len = self.length();
        (len > EPSILON).then(|| self.scale(1.0 / len))
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    b.sub(a).length()
}

/// Squared Euclidean distance between two points.
#[must_use]
pub fn distance_sq(a: Point, b: Point) -> f64 {
    let d = b.sub(a);
    d.x * d.x + d.y * d.y
}

/// Dot product of two vectors.
#[must_use]
pub fn dot(a: Point, b: Point) -> f64 {
    a.x * b.x + a.y * b.y
}

/// Unsigned angle between two vectors in radians, in `[0, PI]`.
///
/// Returns `None` when either vector has zero length.
#[must_use]
pub fn angle_between(a: Point, b: Point) -> Option<f64> {
    let mag = a.length() * b.length();
    if mag <= EPSILON {
        return None;
    }
    Some((dot(a, b) / mag).clamp(-1.0, 1.0).acos())
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
///
/// A degenerate chord (`a == b`) falls back to the distance from `p` to `a`.
#[must_use]
pub fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let chord = b.sub(a);
    let len = chord.length();
    if len <= EPSILON {
        return distance(p, a);
    }
    let rel = p.sub(a);
    (rel.x * chord.y - rel.y * chord.x).abs() / len
}

/// Total length of the polyline through `points`.
pub fn path_length<I>(points: I) -> f64
where
    I: IntoIterator<Item = Point>,
{
    let mut iter = points.into_iter();
    let Some(mut prev) = iter.next() else {
        return 0.0;
    };
    let mut total = 0.0;
    for p in iter {
        total += distance(prev, p);
        prev = p;
    }
    total
}

/// Running arclength at each vertex, starting at zero.
#[must_use]
pub fn cumulative_lengths(points: &[Point]) -> Vec<f64> {
    let mut out = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            total += distance(points[i - 1], *p);
        }
        out.push(total);
    }
    out
}

/// Arithmetic mean and population standard deviation.
///
/// Returns `(0.0, 0.0)` for an empty slice.
#[must_use]
pub fn mean_and_deviation(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_and_sq() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((distance(a, b) - 5.0).abs() < 1e-12);
        assert!((distance_sq(a, b) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_angle_between_guards_zero_vector() {
        assert!(angle_between(Point::new(0.0, 0.0), Point::new(1.0, 0.0)).is_none());
        let right = angle_between(Point::new(1.0, 0.0), Point::new(0.0, 2.0));
        assert!((right.unwrap() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let opposite = angle_between(Point::new(1.0, 0.0), Point::new(-1.0, 0.0));
        assert!((opposite.unwrap() - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_perpendicular_distance() {
        let d = perpendicular_distance(
            Point::new(5.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((d - 3.0).abs() < 1e-12);

        // Degenerate chord
        let d = perpendicular_distance(
            Point::new(3.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
        );
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_path_length_and_cumulative() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(3.0, 10.0),
        ];
        assert!((path_length(pts) - 11.0).abs() < 1e-12);
        assert_eq!(cumulative_lengths(&pts), vec![0.0, 5.0, 11.0]);
        assert!(path_length(std::iter::empty()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize() {
        assert!(Point::new(0.0, 0.0).normalize().is_none());
        let n = Point::new(0.0, 5.0).normalize().unwrap();
        assert!((n.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_and_deviation() {
        let (mean, dev) = mean_and_deviation(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((dev - 2.0).abs() < 1e-12);
        assert_eq!(mean_and_deviation(&[]), (0.0, 0.0));
    }
}
