//! Consecutive duplicate-position removal.

use super::StrokeFilter;
use crate::error::SketchResult;
use crate::stroke::Stroke;

/// Drops consecutive samples at the same position, keeping the first of each run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DedupFilter;

impl DedupFilter {
    /// Remove repeated positions.
    #[must_use]
    pub fn dedup(&self, stroke: &Stroke) -> Stroke {
        let mut points = stroke.points().to_vec();
        points.dedup_by(|next, kept| next.same_position(kept));
        Stroke::from_points(points)
    }
}

impl StrokeFilter for DedupFilter {
    fn apply(&self, stroke: &Stroke) -> SketchResult<Stroke> {
        Ok(self.dedup(stroke))
    }
}
