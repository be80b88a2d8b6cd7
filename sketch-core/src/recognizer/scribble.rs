//! Scribble (zig-zag) recognition.
//!
//! A scribble is a run of straight strokes whose vertical direction flips at
//! every corner: mostly vertical motion sweeping across a region.
//!
//! ```text
//!   /\  /\  /\
//!  /  \/  \/  \
//! ```

use serde::{Deserialize, Serialize};

use super::StrokeRecognizer;
use crate::data::TypedData;
use crate::error::SketchResult;
use crate::filter::{ApproximateFilter, ApproximationConfig};
use crate::geometry::{angle_between, Point, EPSILON};
use crate::recognition::RecognitionSet;
use crate::stroke::Stroke;

/// Configuration for [`ScribbleRecognizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScribbleConfig {
    /// Polyline approximation applied before feature extraction.
    pub approximation: ApproximationConfig,
    /// Turning angle (degrees) above which a vertex counts as a corner.
    pub corner_angle_deg: f64,
    /// Minimum number of corners.
    pub min_corners: usize,
    /// Minimum bounding-box width / height.
    pub min_aspect_ratio: f64,
    /// Minimum total |dy| / total |dx|.
    pub min_delta_ratio: f64,
    /// Delta ratio at which the primary score saturates.
    pub perfect_delta_ratio: f64,
    /// Primary score below which the fallback heuristic is consulted.
    pub low_score: f64,
    /// Delta ratio × aspect ratio needed by the fallback heuristic.
    pub fallback_product: f64,
    /// Confidence granted by the fallback heuristic.
    pub fallback_confidence: f64,
}

impl Default for ScribbleConfig {
    fn default() -> Self {
        Self {
            approximation: ApproximationConfig::default(),
            corner_angle_deg: 90.0,
            min_corners: 4,
            min_aspect_ratio: 0.5,
            min_delta_ratio: 1.5,
            perfect_delta_ratio: 2.2,
            low_score: 0.5,
            fallback_product: 3.5,
            fallback_confidence: 0.5,
        }
    }
}

/// Stroke-level features used for scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Features {
    delta_ratio: f64,
    aspect_ratio: f64,
    corners: usize,
}

/// Recognizes scribbles on stroke completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScribbleRecognizer {
    config: ScribbleConfig,
    filter: ApproximateFilter,
}

impl ScribbleRecognizer {
    /// Create a new scribble recognizer with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ScribbleConfig::default())
    }

    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(config: ScribbleConfig) -> Self {
        Self {
            config,
            filter: ApproximateFilter::with_config(config.approximation),
        }
    }

    /// Score a stroke. Rejected strokes yield an empty set.
    #[must_use]
    pub fn recognize(&self, stroke: &Stroke) -> RecognitionSet {
        let pts = self.filter.approximate(stroke).positions();
        let Some(features) = self.features(&pts) else {
            return RecognitionSet::new();
        };
        let cfg = &self.config;
        if features.corners < cfg.min_corners
            || features.aspect_ratio < cfg.min_aspect_ratio
            || features.delta_ratio < cfg.min_delta_ratio
        {
            tracing::trace!(?features, "not a scribble");
            return RecognitionSet::new();
        }
        if !self.alternates(&pts) {
            tracing::trace!(?features, "scribble segments curve or fail to alternate");
            return RecognitionSet::new();
        }

        let span = cfg.perfect_delta_ratio - cfg.min_delta_ratio;
        let mut confidence = if span > EPSILON {
            ((features.delta_ratio - cfg.min_delta_ratio) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if confidence < cfg.low_score
            && features.delta_ratio * features.aspect_ratio >= cfg.fallback_product
        {
            confidence = confidence.max(cfg.fallback_confidence);
        }
        tracing::debug!(?features, confidence, "scribble recognized");
        RecognitionSet::single(TypedData::Scribble, confidence)
    }

    fn features(&self, pts: &[Point]) -> Option<Features> {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in pts {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let height = max_y - min_y;
        if pts.len() < 2 || height <= EPSILON {
            return None;
        }

        let (sum_dx, sum_dy) = pts.windows(2).fold((0.0, 0.0), |(sx, sy), w| {
            (sx + (w[1].x - w[0].x).abs(), sy + (w[1].y - w[0].y).abs())
        });
        if sum_dx <= EPSILON {
            return None;
        }

        Some(Features {
            delta_ratio: sum_dy / sum_dx,
            aspect_ratio: (max_x - min_x) / height,
            corners: self.corner_indices(pts).len(),
        })
    }

    fn corner_indices(&self, pts: &[Point]) -> Vec<usize> {
        let threshold = self.config.corner_angle_deg.to_radians();
        (1..pts.len().saturating_sub(1))
            .filter(|&i| {
                let incoming = pts[i].sub(pts[i - 1]);
                let outgoing = pts[i + 1].sub(pts[i]);
                angle_between(incoming, outgoing).is_some_and(|a| a > threshold)
            })
            .collect()
    }

    /// Every segment between consecutive corners is straight (no vertices in
    /// between) and vertical direction flips from one segment to the next.
    fn alternates(&self, pts: &[Point]) -> bool {
        let mut bounds = vec![0];
        bounds.extend(self.corner_indices(pts));
        bounds.push(pts.len() - 1);

        let mut prev_up: Option<bool> = None;
        for w in bounds.windows(2) {
            let (a, b) = (w[0], w[1]);
            if b - a > 1 {
                return false;
            }
            let dy = pts[b].y - pts[a].y;
            if dy.abs() <= EPSILON {
                return false;
            }
            let up = dy < 0.0;
            if prev_up == Some(up) {
                return false;
            }
            prev_up = Some(up);
        }
        true
    }
}

impl StrokeRecognizer for ScribbleRecognizer {
    fn stroke_completed(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        Ok(self.recognize(stroke))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::TimedPoint;

    /// Densely sampled polyline through `corners`.
    fn polyline(corners: &[(f64, f64)]) -> Stroke {
        let mut out = Vec::new();
        let mut t = 0;
        for w in corners.windows(2) {
            let (a, b) = (w[0], w[1]);
            for k in 0..8u32 {
                let r = f64::from(k) / 8.0;
                out.push(TimedPoint::new(a.0 + r * (b.0 - a.0), a.1 + r * (b.1 - a.1), t));
                t += 10;
            }
        }
        if let Some(&(x, y)) = corners.last() {
            out.push(TimedPoint::new(x, y, t));
        }
        Stroke::from_points(out)
    }

    fn zigzag(dx: f64, dy: f64, segments: u32) -> Stroke {
        let corners: Vec<(f64, f64)> = (0..=segments)
            .map(|i| (f64::from(i) * dx, if i % 2 == 0 { dy } else { 0.0 }))
            .collect();
        polyline(&corners)
    }

    #[test]
    fn test_tall_zigzag_is_scribble() {
        let set = ScribbleRecognizer::new().recognize(&zigzag(10.0, 40.0, 6));
        let best = set.best().expect("scribble");
        assert_eq!(best.data, TypedData::Scribble);
        assert!((best.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_for_shallow_but_wide_zigzag() {
        // delta ratio 1.8 scores low, but ratio × aspect clears 3.5
        let set = ScribbleRecognizer::new().recognize(&zigzag(10.0, 18.0, 6));
        let best = set.best().expect("scribble");
        assert!((best.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_corners() {
        let set = ScribbleRecognizer::new().recognize(&zigzag(10.0, 40.0, 3));
        assert!(set.is_empty());
        assert!(!set.is_no_recognition());
    }

    #[test]
    fn test_arc_segment_disqualifies() {
        // Same zig-zag, but the last stroke bends halfway down.
        let stroke = polyline(&[
            (0.0, 40.0),
            (10.0, 0.0),
            (20.0, 40.0),
            (30.0, 0.0),
            (40.0, 40.0),
            (50.0, 0.0),
            (52.0, 20.0),
            (60.0, 40.0),
        ]);
        assert!(ScribbleRecognizer::new().recognize(&stroke).is_empty());
    }

    #[test]
    fn test_flat_and_empty_strokes_rejected() {
        let flat = polyline(&[(0.0, 0.0), (100.0, 0.0)]);
        assert!(ScribbleRecognizer::new().recognize(&flat).is_empty());
        assert!(ScribbleRecognizer::new().recognize(&Stroke::new()).is_empty());
    }
}
