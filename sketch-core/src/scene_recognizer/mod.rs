//! # Scene Recognizers
//!
//! Turn strokes already recorded in a [`Scene`] into composite
//! interpretations written back into that scene.
//!
//! ```text
//!  stroke events ─► StrokeSceneRecognizer ─► "line" / "scribble" composites
//!                          │
//!  session done  ─► PolygonRecognizer ─► LlrRecognizer ─► DashedPathRecognizer
//!                          │
//!                          ▼
//!                   SceneDeltaSet (what changed)
//! ```
//!
//! Recognizers mutate the scene directly through `&mut Scene`, so each one
//! sees the complete result of the recognizer it wraps and never a
//! half-applied change. The returned [`SceneDeltaSet`] records what was
//! removed and added. Wrappers always run their child first and merge its
//! changes into their own.

mod dashed;
mod llr;
mod polygon;

pub use dashed::{DashedPathConfig, DashedPathRecognizer};
pub use llr::LlrRecognizer;
pub use polygon::{PolygonConfig, PolygonRecognizer};

use serde::{Deserialize, Serialize};

use crate::delta::{SceneDelta, SceneDeltaSet};
use crate::element::ElementId;
use crate::error::{SketchError, SketchResult};
use crate::recognition::RecognitionSet;
use crate::recognizer::StrokeRecognizer;
use crate::scene::Scene;
use crate::stroke::Stroke;

/// Lifecycle callbacks of a scene-level recognizer.
///
/// Events a recognizer ignores return [`SceneDeltaSet::NO_DELTA`].
pub trait SceneRecognizer {
    /// The pen went down on a new stroke element.
    ///
    /// # Errors
    ///
    /// Returns an error if `stroke` is missing or a wrapped recognizer fails.
    fn stroke_started(
        &mut self,
        _stroke: ElementId,
        _scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        Ok(SceneDeltaSet::NO_DELTA)
    }

    /// Samples were appended to a stroke element.
    ///
    /// # Errors
    ///
    /// Returns an error if `stroke` is missing or a wrapped recognizer fails.
    fn stroke_modified(
        &mut self,
        _stroke: ElementId,
        _scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        Ok(SceneDeltaSet::NO_DELTA)
    }

    /// The pen went up.
    ///
    /// # Errors
    ///
    /// Returns an error if `stroke` is missing or a wrapped recognizer fails.
    fn stroke_completed(
        &mut self,
        _stroke: ElementId,
        _scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        Ok(SceneDeltaSet::NO_DELTA)
    }

    /// A session of related strokes ended.
    ///
    /// # Errors
    ///
    /// Returns an error if a stroke is missing or a wrapped recognizer fails.
    fn session_completed(
        &mut self,
        _strokes: &[ElementId],
        _scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        Ok(SceneDeltaSet::NO_DELTA)
    }
}

impl<R: SceneRecognizer + ?Sized> SceneRecognizer for Box<R> {
    fn stroke_started(
        &mut self,
        stroke: ElementId,
        scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        (**self).stroke_started(stroke, scene)
    }

    fn stroke_modified(
        &mut self,
        stroke: ElementId,
        scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        (**self).stroke_modified(stroke, scene)
    }

    fn stroke_completed(
        &mut self,
        stroke: ElementId,
        scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        (**self).stroke_completed(stroke, scene)
    }

    fn session_completed(
        &mut self,
        strokes: &[ElementId],
        scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        (**self).session_completed(strokes, scene)
    }
}

pub(crate) fn scene_stroke(scene: &Scene, id: ElementId) -> SketchResult<&Stroke> {
    scene.stroke(id).ok_or(SketchError::ElementNotFound(id))
}

/// Configuration for [`StrokeSceneRecognizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeSceneConfig {
    /// Recognitions below this confidence are not written to the scene.
    pub min_confidence: f64,
}

impl Default for StrokeSceneConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
        }
    }
}

/// Writes a stroke recognizer's final results into the scene.
///
/// On completion, each recognition at or above the minimum confidence
/// becomes a composite with the stroke as its single child named
/// `"stroke"`. Confidences are clamped to `[0, 1]` here. Started and
/// modified events are forwarded so stateful recognizers stay in step;
/// their results are kept in [`StrokeSceneRecognizer::latest`].
#[derive(Debug, Clone)]
pub struct StrokeSceneRecognizer<R> {
    recognizer: R,
    config: StrokeSceneConfig,
    latest: RecognitionSet,
}

impl<R: StrokeRecognizer> StrokeSceneRecognizer<R> {
    /// Wrap a stroke recognizer with default configuration.
    #[must_use]
    pub fn new(recognizer: R) -> Self {
        Self::with_config(recognizer, StrokeSceneConfig::default())
    }

    /// Wrap a stroke recognizer.
    #[must_use]
    pub const fn with_config(recognizer: R, config: StrokeSceneConfig) -> Self {
        Self {
            recognizer,
            config,
            latest: RecognitionSet::NO_RECOGNITION,
        }
    }

    /// The wrapped recognizer.
    #[must_use]
    pub const fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Result of the most recent started or modified event.
    #[must_use]
    pub const fn latest(&self) -> &RecognitionSet {
        &self.latest
    }
}

impl<R: StrokeRecognizer> SceneRecognizer for StrokeSceneRecognizer<R> {
    fn stroke_started(
        &mut self,
        stroke: ElementId,
        scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        self.latest = self.recognizer.stroke_started(scene_stroke(scene, stroke)?)?;
        Ok(SceneDeltaSet::NO_DELTA)
    }

    fn stroke_modified(
        &mut self,
        stroke: ElementId,
        scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        self.latest = self.recognizer.stroke_modified(scene_stroke(scene, stroke)?)?;
        Ok(SceneDeltaSet::NO_DELTA)
    }

    fn stroke_completed(
        &mut self,
        stroke: ElementId,
        scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        let set = self.recognizer.stroke_completed(scene_stroke(scene, stroke)?)?;
        self.latest = RecognitionSet::NO_RECOGNITION;

        let mut deltas = SceneDeltaSet::NO_DELTA;
        for r in set.iter().filter(|r| r.confidence >= self.config.min_confidence) {
            let confidence = r.confidence.clamp(0.0, 1.0);
            let added = scene.add_composite(
                r.data.clone(),
                confidence,
                vec![("stroke".to_string(), stroke)],
            )?;
            deltas.push(SceneDelta::additive(added));
        }
        Ok(deltas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataType, TypedData};
    use crate::recognizer::LineRecognizer;

    #[test]
    fn test_completed_stroke_gets_line_parent() {
        let mut scene = Scene::new();
        let s = scene.add_stroke(Stroke::from_triples(&[
            (0.0, 0.0, 0),
            (50.0, 0.0, 10),
            (100.0, 0.0, 20),
        ]));
        let mut rec = StrokeSceneRecognizer::new(LineRecognizer::new());

        assert!(rec.stroke_started(s, &mut scene).unwrap().is_no_delta());
        let deltas = rec.stroke_completed(s, &mut scene).unwrap();
        assert_eq!(deltas.len(), 1);

        let line = deltas.added()[0];
        let composite = scene.composite(line).unwrap();
        assert!(composite.data.is_type(&DataType::Line));
        assert!((composite.confidence - 1.0).abs() < f64::EPSILON);
        assert_eq!(composite.child("stroke"), Some(s));
        assert_eq!(scene.parents(s), &[line]);
    }

    #[test]
    fn test_low_confidence_is_not_written() {
        let mut scene = Scene::new();
        // Bowed far enough that the line confidence goes negative.
        let s = scene.add_stroke(Stroke::from_triples(&[
            (0.0, 0.0, 0),
            (50.0, 150.0, 10),
            (100.0, 0.0, 20),
        ]));
        let mut rec = StrokeSceneRecognizer::new(LineRecognizer::new());
        assert!(rec.stroke_completed(s, &mut scene).unwrap().is_no_delta());
        assert_eq!(scene.composite_count(), 0);
    }

    #[test]
    fn test_confidence_is_clamped() {
        struct Overconfident;
        impl StrokeRecognizer for Overconfident {
            fn stroke_completed(&mut self, _stroke: &Stroke) -> SketchResult<RecognitionSet> {
                Ok(RecognitionSet::single(TypedData::Scribble, 1.7))
            }
        }

        let mut scene = Scene::new();
        let s = scene.add_stroke(Stroke::from_triples(&[(0.0, 0.0, 0)]));
        let mut rec = StrokeSceneRecognizer::new(Overconfident);
        let added = rec.stroke_completed(s, &mut scene).unwrap().added();
        assert!((scene.composite(added[0]).unwrap().confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_stroke_is_an_error() {
        let mut scene = Scene::new();
        let mut rec = StrokeSceneRecognizer::new(LineRecognizer::new());
        let err = rec.stroke_completed(ElementId::from_raw(3), &mut scene);
        assert!(matches!(err, Err(SketchError::ElementNotFound(_))));
    }
}
