//! Densification by recursive midpoint bisection.

use serde::{Deserialize, Serialize};

use super::StrokeFilter;
use crate::error::{SketchError, SketchResult};
use crate::geometry::distance;
use crate::stroke::{Stroke, TimedPoint};

/// Configuration for [`InterpolateFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolateConfig {
    /// Maximum distance allowed between consecutive samples.
    pub max_spacing: f64,
}

impl Default for InterpolateConfig {
    fn default() -> Self {
        Self { max_spacing: 20.0 }
    }
}

/// Inserts midpoints until no two consecutive samples are farther apart
/// than [`InterpolateConfig::max_spacing`].
///
/// Original samples are preserved exactly and in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterpolateFilter {
    config: InterpolateConfig,
}

impl InterpolateFilter {
    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(config: InterpolateConfig) -> Self {
        Self { config }
    }

    /// Densify the stroke.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidParameter`] if the spacing is not
    /// positive, or if a sample has a non-finite coordinate or lies too far
    /// from its neighbour for the gap to be finite.
    pub fn interpolate(&self, stroke: &Stroke) -> SketchResult<Stroke> {
        if self.config.max_spacing.is_nan() || self.config.max_spacing <= 0.0 {
            return Err(SketchError::InvalidParameter(format!(
                "max_spacing must be positive, got {}",
                self.config.max_spacing
            )));
        }
        let pts = stroke.points();
        if let Some(i) = pts.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(SketchError::InvalidParameter(format!(
                "sample {i} has a non-finite coordinate"
            )));
        }
        let mut out = Vec::with_capacity(pts.len());
        for (i, p) in pts.iter().enumerate() {
            if i > 0 {
                if !distance(pts[i - 1].point(), p.point()).is_finite() {
                    return Err(SketchError::InvalidParameter(format!(
                        "gap before sample {i} overflows"
                    )));
                }
                self.bisect(pts[i - 1], *p, &mut out);
            }
            out.push(*p);
        }
        Ok(Stroke::from_points(out))
    }

    /// Push the midpoints strictly between `a` and `b`, in order.
    fn bisect(&self, a: TimedPoint, b: TimedPoint, out: &mut Vec<TimedPoint>) {
        if distance(a.point(), b.point()) <= self.config.max_spacing {
            return;
        }
        let mid = TimedPoint::new(
            (a.x + b.x) * 0.5,
            (a.y + b.y) * 0.5,
            a.t / 2 + b.t / 2 + (a.t % 2 + b.t % 2) / 2,
        );
        self.bisect(a, mid, out);
        out.push(mid);
        self.bisect(mid, b, out);
    }
}

impl StrokeFilter for InterpolateFilter {
    fn apply(&self, stroke: &Stroke) -> SketchResult<Stroke> {
        self.interpolate(stroke)
    }
}
