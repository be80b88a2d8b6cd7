//! Recursive polyline approximation (Douglas-Peucker).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::StrokeFilter;
use crate::error::SketchResult;
use crate::geometry::{perpendicular_distance, Point};
use crate::stroke::Stroke;

/// Configuration for [`ApproximateFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproximationConfig {
    /// Maximum allowed distance from a dropped sample to its chord.
    pub dist_threshold: f64,
}

impl Default for ApproximationConfig {
    fn default() -> Self {
        Self {
            dist_threshold: 2.0,
        }
    }
}

/// Approximates a stroke by line segments.
///
/// Splits at the interior sample farthest from the chord while that
/// distance exceeds the threshold. The first and last samples are always
/// kept; on ties the lowest index wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFilter {
    config: ApproximationConfig,
}

impl ApproximateFilter {
    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(config: ApproximationConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &ApproximationConfig {
        &self.config
    }

    /// Sorted, duplicate-free indices of the samples to keep.
    #[must_use]
    pub fn kept_indices(&self, stroke: &Stroke) -> Vec<usize> {
        let n = stroke.vertex_count();
        if n < 3 {
            return (0..n).collect();
        }
        let pts = stroke.positions();
        let mut kept = BTreeSet::from([0, n - 1]);
        self.split(&pts, 0, n - 1, &mut kept);
        kept.into_iter().collect()
    }

    /// Simplify the stroke.
    #[must_use]
    pub fn approximate(&self, stroke: &Stroke) -> Stroke {
        let points = stroke.points();
        self.kept_indices(stroke)
            .into_iter()
            .map(|i| points[i])
            .collect()
    }

    fn split(&self, pts: &[Point], first: usize, last: usize, kept: &mut BTreeSet<usize>) {
        if last <= first + 1 {
            return;
        }
        let (a, b) = (pts[first], pts[last]);
        let mut max_dist = 0.0;
        let mut max_index = first;
        for (i, p) in pts.iter().enumerate().take(last).skip(first + 1) {
            let d = perpendicular_distance(*p, a, b);
            if d > max_dist {
                max_dist = d;
                max_index = i;
            }
        }
        if max_dist > self.config.dist_threshold {
            kept.insert(max_index);
            self.split(pts, first, max_index, kept);
            self.split(pts, max_index, last, kept);
        }
    }
}

impl StrokeFilter for ApproximateFilter {
    fn apply(&self, stroke: &Stroke) -> SketchResult<Stroke> {
        Ok(self.approximate(stroke))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::TimedPoint;
    use proptest::prelude::*;

    #[test]
    fn test_collinear_collapses_to_two() {
        let stroke: Stroke = (0..50u32)
            .map(|i| TimedPoint::new(f64::from(i) * 3.0, f64::from(i) * 1.5, u64::from(i)))
            .collect();
        let out = ApproximateFilter::default().approximate(&stroke);
        assert_eq!(out.vertex_count(), 2);
        assert_eq!(out.first(), stroke.first());
        assert_eq!(out.last(), stroke.last());
    }

    #[test]
    fn test_keeps_corner() {
        let stroke = Stroke::from_triples(&[
            (0.0, 0.0, 0),
            (10.0, 0.0, 1),
            (20.0, 0.0, 2),
            (20.0, 10.0, 3),
            (20.0, 20.0, 4),
        ]);
        let filter = ApproximateFilter::default();
        assert_eq!(filter.kept_indices(&stroke), vec![0, 2, 4]);
    }

    #[test]
    fn test_tie_prefers_lowest_index() {
        // Indices 1 and 3 are equally far from the chord.
        let stroke = Stroke::from_triples(&[
            (0.0, 0.0, 0),
            (10.0, 10.0, 1),
            (20.0, 0.0, 2),
            (30.0, 10.0, 3),
            (40.0, 0.0, 4),
        ]);
        let config = ApproximationConfig {
            dist_threshold: 9.0,
        };
        let kept = ApproximateFilter::with_config(config).kept_indices(&stroke);
        assert_eq!(kept[1], 1);
    }

    #[test]
    fn test_short_strokes_unchanged() {
        let filter = ApproximateFilter::default();
        assert!(filter.approximate(&Stroke::new()).is_empty());
        let two = Stroke::from_triples(&[(0.0, 0.0, 0), (0.0, 9.0, 1)]);
        assert_eq!(filter.approximate(&two).points(), two.points());
    }

    proptest! {
        #[test]
        fn prop_keeps_endpoints(
            coords in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 1..60)
        ) {
            let stroke: Stroke = coords
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| TimedPoint::new(x, y, i as u64))
                .collect();
            let kept = ApproximateFilter::default().kept_indices(&stroke);
            prop_assert_eq!(kept.first().copied(), Some(0));
            prop_assert_eq!(kept.last().copied(), Some(stroke.vertex_count() - 1));
            prop_assert!(kept.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn prop_collinear_always_two(
            n in 3usize..200,
            dx in 0.5f64..20.0,
            dy in -20.0f64..20.0,
        ) {
            let stroke: Stroke = (0..n)
                .map(|i| {
                    let k = i as f64;
                    TimedPoint::new(k * dx, k * dy, i as u64)
                })
                .collect();
            prop_assert_eq!(ApproximateFilter::default().approximate(&stroke).vertex_count(), 2);
        }
    }
}
