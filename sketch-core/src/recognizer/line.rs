//! Straight-line recognition.

use serde::{Deserialize, Serialize};

use super::StrokeRecognizer;
use crate::data::TypedData;
use crate::error::SketchResult;
use crate::filter::{ApproximateFilter, ApproximationConfig};
use crate::geometry::perpendicular_distance;
use crate::recognition::RecognitionSet;
use crate::stroke::Stroke;

/// Configuration for [`LineRecognizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// Polyline approximation applied before measuring straightness.
    pub approximation: ApproximationConfig,
    /// Bow (in canvas units) at which confidence reaches zero.
    pub distance_scale: f64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            approximation: ApproximationConfig::default(),
            distance_scale: 100.0,
        }
    }
}

/// Recognizes straight lines on stroke completion.
///
/// Confidence is `1 - max_bow / distance_scale`, where `max_bow` is the
/// largest distance of an approximated vertex from the end-to-end chord.
/// The value is deliberately left unclamped and goes negative for strongly
/// bowed strokes; scene adapters clamp it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineRecognizer {
    config: LineConfig,
    filter: ApproximateFilter,
}

impl LineRecognizer {
    /// Create a new line recognizer with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LineConfig::default())
    }

    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(config: LineConfig) -> Self {
        Self {
            config,
            filter: ApproximateFilter::with_config(config.approximation),
        }
    }

    /// Score a stroke.
    #[must_use]
    pub fn recognize(&self, stroke: &Stroke) -> RecognitionSet {
        let approx = self.filter.approximate(stroke);
        let pts = approx.positions();
        let (Some(&start), Some(&end)) = (pts.first(), pts.last()) else {
            return RecognitionSet::NO_RECOGNITION;
        };

        let confidence = match pts.len() {
            1 => 0.0,
            2 => 1.0,
            _ => {
                let bow = pts[1..pts.len() - 1]
                    .iter()
                    .map(|p| perpendicular_distance(*p, start, end))
                    .fold(0.0, f64::max);
                1.0 - bow / self.config.distance_scale
            }
        };
        tracing::trace!(vertices = pts.len(), confidence, "line score");
        RecognitionSet::single(TypedData::Line { start, end }, confidence)
    }
}

impl StrokeRecognizer for LineRecognizer {
    fn stroke_completed(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        Ok(self.recognize(stroke))
    }
}
