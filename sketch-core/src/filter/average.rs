//! Three-point weighted smoothing.

use super::StrokeFilter;
use crate::error::SketchResult;
use crate::stroke::{Stroke, TimedPoint};

/// Smooths interior samples with `0.25·prev + 0.5·cur + 0.25·next`.
///
/// Timestamps take the plain mean of the three samples. Endpoints pass
/// through unchanged. Strokes with fewer than 3 samples are returned as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageFilter;

impl AverageFilter {
    /// Smooth the stroke.
    #[must_use]
    pub fn smooth(&self, stroke: &Stroke) -> Stroke {
        let pts = stroke.points();
        if pts.len() < 3 {
            tracing::trace!(points = pts.len(), "too few points to smooth");
            return Stroke::from_points(pts.to_vec());
        }

        let mut out = Vec::with_capacity(pts.len());
        out.push(pts[0]);
        for w in pts.windows(3) {
            let (prev, cur, next) = (w[0], w[1], w[2]);
            let t = (u128::from(prev.t) + u128::from(cur.t) + u128::from(next.t)) / 3;
            out.push(TimedPoint::new(
                0.25 * prev.x + 0.5 * cur.x + 0.25 * next.x,
                0.25 * prev.y + 0.5 * cur.y + 0.25 * next.y,
                u64::try_from(t).unwrap_or(cur.t),
            ));
        }
        out.push(pts[pts.len() - 1]);
        Stroke::from_points(out)
    }
}

impl StrokeFilter for AverageFilter {
    fn apply(&self, stroke: &Stroke) -> SketchResult<Stroke> {
        Ok(self.smooth(stroke))
    }
}
