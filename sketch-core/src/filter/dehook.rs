//! Removal of pen lead-in and lead-out hooks.
//!
//! A hook is a short flick at either end of a stroke that bends sharply away
//! from the stroke's general direction. For each end, the general direction
//! runs from the point at `direction_fraction` of the arclength to the tip.
//! Scanning from the `head_fraction` point toward the tip, the first local
//! segment that deviates from that direction by more than the angle
//! threshold marks the cut; everything past it is discarded.

use serde::{Deserialize, Serialize};

use super::StrokeFilter;
use crate::error::SketchResult;
use crate::geometry::{angle_between, cumulative_lengths, Point, EPSILON};
use crate::stroke::Stroke;

/// Configuration for [`DehookFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DehookConfig {
    /// Deviation (degrees) beyond which a segment is part of a hook.
    pub angle_threshold_deg: f64,
    /// Fraction of the arclength from each end where the inward scan starts.
    pub head_fraction: f64,
    /// Fraction of the arclength defining the general direction vector.
    pub direction_fraction: f64,
}

impl Default for DehookConfig {
    fn default() -> Self {
        Self {
            angle_threshold_deg: 45.0,
            head_fraction: 0.1,
            direction_fraction: 0.2,
        }
    }
}

/// Trims hooks from both ends of a stroke.
#[derive(Debug, Clone, Copy, Default)]
pub struct DehookFilter {
    config: DehookConfig,
}

impl DehookFilter {
    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(config: DehookConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &DehookConfig {
        &self.config
    }

    /// Index range `[start, end]` of the samples that survive dehooking.
    ///
    /// The range is always within `[0, n-1]` with `start <= end`; empty
    /// strokes yield `(0, 0)`.
    #[must_use]
    pub fn trim_range(&self, stroke: &Stroke) -> (usize, usize) {
        let n = stroke.vertex_count();
        if n < 3 {
            return (0, n.saturating_sub(1));
        }
        let pts = stroke.positions();
        let forward = cumulative_lengths(&pts);
        let total = forward[n - 1];
        if total <= EPSILON {
            return (0, n - 1);
        }

        let mut reversed = pts.clone();
        reversed.reverse();
        let backward = cumulative_lengths(&reversed);

        let start = self.hook_cut(&pts, &forward, total);
        let end = n - 1 - self.hook_cut(&reversed, &backward, total);

        if start >= end {
            tracing::debug!(start, end, "dehook cuts overlap, keeping stroke intact");
            return (0, n - 1);
        }
        (start, end)
    }

    /// Trim hooks and return the surviving samples.
    #[must_use]
    pub fn dehook(&self, stroke: &Stroke) -> Stroke {
        if stroke.is_empty() {
            return Stroke::new();
        }
        let (start, end) = self.trim_range(stroke);
        Stroke::from_points(stroke.points()[start..=end].to_vec())
    }

    /// Index (from the tip at 0) of the first retained sample at this end.
    fn hook_cut(&self, pts: &[Point], lengths: &[f64], total: f64) -> usize {
        let scan_from = index_at_length(lengths, total * self.config.head_fraction);
        let anchor = index_at_length(lengths, total * self.config.direction_fraction);
        let general = pts[0].sub(pts[anchor]);
        let threshold = self.config.angle_threshold_deg.to_radians();

        for i in (1..=scan_from).rev() {
            let local = pts[i - 1].sub(pts[i]);
            let Some(angle) = angle_between(local, general) else {
                continue;
            };
            if angle > threshold {
                tracing::trace!(cut = i, angle = angle.to_degrees(), "hook detected");
                return i;
            }
        }
        0
    }
}

/// First index whose cumulative length reaches `target`.
fn index_at_length(lengths: &[f64], target: f64) -> usize {
    lengths
        .iter()
        .position(|&l| l >= target)
        .unwrap_or(lengths.len().saturating_sub(1))
}

impl StrokeFilter for DehookFilter {
    fn apply(&self, stroke: &Stroke) -> SketchResult<Stroke> {
        Ok(self.dehook(stroke))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Horizontal line from (0,0) to (100,0) in steps of 5, optionally
    /// preceded by a downward lead-in hook.
    fn line_with_head_hook(hook: bool) -> Stroke {
        let mut triples = Vec::new();
        if hook {
            triples.push((2.0, 8.0, 0));
            triples.push((1.0, 4.0, 5));
        }
        for k in 0..=20u32 {
            triples.push((f64::from(k) * 5.0, 0.0, 10 + u64::from(k) * 5));
        }
        Stroke::from_triples(&triples)
    }

    #[test]
    fn test_trims_head_hook_only() {
        let stroke = line_with_head_hook(true);
        let filter = DehookFilter::default();
        let (start, end) = filter.trim_range(&stroke);
        assert!(start > 0, "hook should be trimmed");
        assert_eq!(start, 2);
        assert_eq!(end, stroke.vertex_count() - 1);

        let out = filter.dehook(&stroke);
        assert_eq!(out.vertex_count(), 21);
        assert_eq!(out.first().unwrap().point(), Point::new(0.0, 0.0));
        assert_eq!(out.last(), stroke.last());
    }

    #[test]
    fn test_straight_line_unchanged() {
        let stroke = line_with_head_hook(false);
        let filter = DehookFilter::default();
        assert_eq!(filter.trim_range(&stroke), (0, stroke.vertex_count() - 1));
    }

    #[test]
    fn test_trims_tail_hook() {
        let mut triples: Vec<(f64, f64, u64)> =
            (0..=20u32).map(|k| (f64::from(k) * 5.0, 0.0, u64::from(k))).collect();
        triples.push((101.0, 4.0, 21));
        triples.push((102.0, 8.0, 22));
        let stroke = Stroke::from_triples(&triples);

        let (start, end) = DehookFilter::default().trim_range(&stroke);
        assert_eq!(start, 0);
        assert_eq!(end, 20);
    }

    #[test]
    fn test_degenerate_strokes_stay_in_range() {
        let filter = DehookFilter::default();
        assert_eq!(filter.trim_range(&Stroke::new()), (0, 0));
        assert!(filter.dehook(&Stroke::new()).is_empty());

        let two = Stroke::from_triples(&[(0.0, 0.0, 0), (1.0, 1.0, 1)]);
        assert_eq!(filter.trim_range(&two), (0, 1));

        // Zero arclength
        let dot = Stroke::from_triples(&[(1.0, 1.0, 0), (1.0, 1.0, 1), (1.0, 1.0, 2)]);
        assert_eq!(filter.trim_range(&dot), (0, 2));

        // Tight zig-zag: cuts would cross, so the stroke is kept whole
        let zigzag = Stroke::from_triples(&[(0.0, 0.0, 0), (1.0, 1.0, 1), (0.0, 2.0, 2), (1.0, 3.0, 3)]);
        let (start, end) = filter.trim_range(&zigzag);
        assert!(start <= end && end < zigzag.vertex_count());
    }
}
