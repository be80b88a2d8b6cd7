//! Continuous pan and zoom gestures.
//!
//! Both start by drawing an initiating letter shape ("P" for pan, "Z" for
//! zoom) recognized by a wrapped classifier. Once the classifier is
//! confident, the rest of the same stroke drives the action.

use serde::{Deserialize, Serialize};

use super::{ActionRecognizer, ModedState, StrokeRecognizer};
use crate::data::{DataType, TypedData};
use crate::error::SketchResult;
use crate::recognition::RecognitionSet;
use crate::stroke::Stroke;

/// When a gesture's initiating signal counts as recognized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Classifier type that initiates the gesture.
    pub signal: DataType,
    /// Samples required before the classifier is consulted.
    pub min_points: usize,
    /// Classifier confidence the signal must exceed.
    pub min_confidence: f64,
}

impl ActionConfig {
    /// Defaults for the pan gesture ("P").
    #[must_use]
    pub fn pan() -> Self {
        Self {
            signal: DataType::Label("P".to_string()),
            ..Self::default()
        }
    }

    /// Defaults for the zoom gesture ("Z").
    #[must_use]
    pub fn zoom() -> Self {
        Self {
            signal: DataType::Label("Z".to_string()),
            ..Self::default()
        }
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            signal: DataType::Label("P".to_string()),
            min_points: 10,
            min_confidence: 0.9,
        }
    }
}

/// Consult the classifier and report the signal's confidence if accepted.
fn detect_signal<C: StrokeRecognizer>(
    classifier: &mut C,
    config: &ActionConfig,
    stroke: &Stroke,
) -> SketchResult<Option<f64>> {
    if stroke.vertex_count() < config.min_points {
        return Ok(None);
    }
    let set = classifier.stroke_modified(stroke)?;
    let confidence = set
        .best_of_type(&config.signal)
        .map(|r| r.confidence)
        .filter(|&c| c > config.min_confidence);
    if let Some(c) = confidence {
        tracing::debug!(signal = %config.signal, confidence = c, "gesture signal recognized");
    }
    Ok(confidence)
}

/// Pan: after a "P", emits the displacement between the last two samples.
#[derive(Debug, Clone)]
pub struct PanAction<C> {
    classifier: C,
    config: ActionConfig,
    confidence: f64,
}

impl<C: StrokeRecognizer> PanAction<C> {
    /// Create with the default pan configuration.
    #[must_use]
    pub fn new(classifier: C) -> Self {
        Self::with_config(classifier, ActionConfig::pan())
    }

    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(classifier: C, config: ActionConfig) -> Self {
        Self {
            classifier,
            config,
            confidence: 0.0,
        }
    }
}

impl<C: StrokeRecognizer> ActionRecognizer for PanAction<C> {
    fn recognize_action_signal(
        &mut self,
        stroke: &Stroke,
    ) -> SketchResult<(ModedState, RecognitionSet)> {
        match detect_signal(&mut self.classifier, &self.config, stroke)? {
            Some(confidence) => {
                self.confidence = confidence;
                Ok((ModedState::Action, RecognitionSet::NO_RECOGNITION))
            }
            None => Ok((ModedState::Unknown, RecognitionSet::NO_RECOGNITION)),
        }
    }

    fn process_action_stroke(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        let n = stroke.vertex_count();
        let (Some(prev), Some(last)) = (stroke.get(n.wrapping_sub(2)), stroke.last()) else {
            return Ok(RecognitionSet::NO_RECOGNITION);
        };
        let data = TypedData::Pan {
            dx: last.x - prev.x,
            dy: last.y - prev.y,
        };
        Ok(RecognitionSet::single(data, self.confidence))
    }

    fn reset(&mut self) {
        self.confidence = 0.0;
    }
}

/// Configuration for [`ZoomAction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Signal recognition settings.
    pub action: ActionConfig,
    /// Upward travel (canvas units) that doubles the scale.
    pub units_per_doubling: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            action: ActionConfig::zoom(),
            units_per_doubling: 100.0,
        }
    }
}

/// Zoom: after a "Z", emits `2^(rise / units_per_doubling)`, where `rise`
/// is the upward travel since the sample at which the "Z" was recognized.
#[derive(Debug, Clone)]
pub struct ZoomAction<C> {
    classifier: C,
    config: ZoomConfig,
    pivot: Option<usize>,
    confidence: f64,
}

impl<C: StrokeRecognizer> ZoomAction<C> {
    /// Create with the default zoom configuration.
    #[must_use]
    pub fn new(classifier: C) -> Self {
        Self::with_config(classifier, ZoomConfig::default())
    }

    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(classifier: C, config: ZoomConfig) -> Self {
        Self {
            classifier,
            config,
            pivot: None,
            confidence: 0.0,
        }
    }

    /// Index of the sample the zoom is measured from, once recognized.
    #[must_use]
    pub const fn pivot(&self) -> Option<usize> {
        self.pivot
    }
}

impl<C: StrokeRecognizer> ActionRecognizer for ZoomAction<C> {
    fn recognize_action_signal(
        &mut self,
        stroke: &Stroke,
    ) -> SketchResult<(ModedState, RecognitionSet)> {
        match detect_signal(&mut self.classifier, &self.config.action, stroke)? {
            Some(confidence) => {
                self.confidence = confidence;
                self.pivot = stroke.vertex_count().checked_sub(1);
                Ok((ModedState::Action, RecognitionSet::NO_RECOGNITION))
            }
            None => Ok((ModedState::Unknown, RecognitionSet::NO_RECOGNITION)),
        }
    }

    fn process_action_stroke(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        let (Some(pivot), Some(last)) = (self.pivot.and_then(|i| stroke.get(i)), stroke.last())
        else {
            return Ok(RecognitionSet::NO_RECOGNITION);
        };
        if self.config.units_per_doubling <= 0.0 {
            return Ok(RecognitionSet::NO_RECOGNITION);
        }
        // Canvas y grows downward: moving up zooms in.
        let rise = pivot.y - last.y;
        let scale = (rise / self.config.units_per_doubling).exp2();
        Ok(RecognitionSet::single(TypedData::Zoom { scale }, self.confidence))
    }

    fn reset(&mut self) {
        self.pivot = None;
        self.confidence = 0.0;
    }
}
