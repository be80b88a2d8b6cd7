//! Aggregated configuration and the standard recognizer stack.
//!
//! Every filter and recognizer takes its own config struct with documented
//! defaults. [`SketchConfig`] gathers them so a whole setup can be loaded
//! from, or saved to, one JSON document. Missing fields fall back to their
//! defaults.

use serde::{Deserialize, Serialize};

use crate::error::SketchResult;
use crate::filter::{
    DedupFilter, DehookConfig, DehookFilter, FilterPipeline, InterpolateConfig, InterpolateFilter,
};
use crate::interpreter::{SessionConfig, SketchInterpreter};
use crate::recognizer::{
    ActionConfig, CachingRecognizer, FilteredRecognizer, LineConfig, LineRecognizer,
    ModedRecognizer, PanAction, ScribbleConfig, ScribbleRecognizer, StrokeRecognizer,
    VotingRecognizer, ZoomAction, ZoomConfig,
};
use crate::scene_recognizer::{
    DashedPathConfig, DashedPathRecognizer, LlrRecognizer, PolygonConfig, PolygonRecognizer,
    StrokeSceneConfig, StrokeSceneRecognizer,
};

/// Single-stroke recognizer used by the standard stack.
pub type StandardStrokeRecognizer = CachingRecognizer<VotingRecognizer>;

/// Scene recognizer stack built by [`SketchConfig::scene_recognizer`].
pub type StandardSceneRecognizer = DashedPathRecognizer<
    LlrRecognizer<PolygonRecognizer<StrokeSceneRecognizer<StandardStrokeRecognizer>>>,
>;

/// Every tunable of the recognition core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Hook removal.
    pub dehook: DehookConfig,
    /// Fixed-spacing interpolation.
    pub interpolate: InterpolateConfig,
    /// Line recognizer.
    pub line: LineConfig,
    /// Scribble recognizer.
    pub scribble: ScribbleConfig,
    /// Pan gesture.
    pub pan: ActionConfig,
    /// Zoom gesture.
    pub zoom: ZoomConfig,
    /// Writing stroke results into the scene.
    pub stroke_scene: StrokeSceneConfig,
    /// Polygon recognizer.
    pub polygon: PolygonConfig,
    /// Dashed-path recognizer.
    pub dashed: DashedPathConfig,
    /// Session grouping.
    pub session: SessionConfig,
}

impl SketchConfig {
    /// Parse from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON for this type.
    pub fn from_json(json: &str) -> SketchResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> SketchResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clean-up filters for raw pen strokes: dedup, dehook, interpolate.
    #[must_use]
    pub fn filter_pipeline(&self) -> FilterPipeline {
        FilterPipeline::new()
            .then(DedupFilter)
            .then(DehookFilter::with_config(self.dehook))
            .then(InterpolateFilter::with_config(self.interpolate))
    }

    /// Line and scribble recognizers voting behind a cache.
    ///
    /// Lines are scored on the output of [`SketchConfig::filter_pipeline`].
    /// Scribbles see the raw stroke: their zig-zag ends would be trimmed as
    /// hooks.
    #[must_use]
    pub fn stroke_recognizer(&self) -> StandardStrokeRecognizer {
        let line = FilteredRecognizer::new(
            self.filter_pipeline(),
            LineRecognizer::with_config(self.line),
        );
        CachingRecognizer::new(
            VotingRecognizer::new()
                .with(line)
                .with(ScribbleRecognizer::with_config(self.scribble)),
        )
    }

    /// The standard scene stack: per-stroke results, polygons, LLR
    /// aggregation, then dashed paths.
    #[must_use]
    pub fn scene_recognizer(&self) -> StandardSceneRecognizer {
        let strokes =
            StrokeSceneRecognizer::with_config(self.stroke_recognizer(), self.stroke_scene);
        let polygon = PolygonRecognizer::with_config(strokes, self.polygon);
        DashedPathRecognizer::with_config(LlrRecognizer::new(polygon), self.dashed)
    }

    /// Pan gesture driven by `classifier`'s initiating signal.
    #[must_use]
    pub fn pan_recognizer<C: StrokeRecognizer>(
        &self,
        classifier: C,
    ) -> ModedRecognizer<PanAction<C>> {
        ModedRecognizer::new(PanAction::with_config(classifier, self.pan.clone()))
    }

    /// Zoom gesture driven by `classifier`'s initiating signal.
    #[must_use]
    pub fn zoom_recognizer<C: StrokeRecognizer>(
        &self,
        classifier: C,
    ) -> ModedRecognizer<ZoomAction<C>> {
        ModedRecognizer::new(ZoomAction::with_config(classifier, self.zoom.clone()))
    }

    /// An interpreter running the standard scene stack.
    #[must_use]
    pub fn interpreter(&self) -> SketchInterpreter<StandardSceneRecognizer> {
        SketchInterpreter::with_config(self.scene_recognizer(), self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataType, TypedData};
    use crate::recognition::RecognitionSet;
    use crate::recognizer::ModedState;
    use crate::stroke::{Stroke, TimedPoint};

    /// Horizontal line from (0,0) to (100,0) with a short lead-in hook.
    fn hooked_line() -> Stroke {
        let mut triples = vec![(2.0, 8.0, 0), (1.0, 4.0, 5)];
        triples.extend((0..=20u32).map(|k| (f64::from(k) * 5.0, 0.0, 10 + u64::from(k) * 5)));
        Stroke::from_triples(&triples)
    }

    fn line_confidence(config: &SketchConfig, stroke: &Stroke) -> f64 {
        let set = config.stroke_recognizer().stroke_completed(stroke).unwrap();
        set.best_of_type(&DataType::Line).unwrap().confidence
    }

    /// Classifies every stroke as a "P" with a fixed confidence.
    struct LetterP(f64);

    impl StrokeRecognizer for LetterP {
        fn stroke_modified(&mut self, _stroke: &Stroke) -> SketchResult<RecognitionSet> {
            Ok(RecognitionSet::single(TypedData::label("P"), self.0))
        }
    }

    fn pan_state(config: &SketchConfig) -> ModedState {
        let mut pan = config.pan_recognizer(LetterP(0.95));
        let mut stroke = Stroke::new();
        stroke.push(TimedPoint::new(0.0, 0.0, 0));
        pan.stroke_started(&stroke).unwrap();
        for i in 1..12u32 {
            stroke.push(TimedPoint::new(f64::from(i) * 5.0, 0.0, u64::from(i) * 10));
            pan.stroke_modified(&stroke).unwrap();
        }
        pan.state()
    }

    #[test]
    fn test_defaults_round_trip_through_json() {
        let config = SketchConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(SketchConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let json = r#"{ "polygon": { "min_line_confidence": 0.8 }, "session": { "pause_ms": 250 } }"#;
        let config = SketchConfig::from_json(json).unwrap();
        assert!((config.polygon.min_line_confidence - 0.8).abs() < f64::EPSILON);
        assert!((config.polygon.endpoint_dist_sq - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.session.pause_ms, 250);
        assert_eq!(config.pan.signal, DataType::Label("P".to_string()));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(SketchConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_filter_pipeline_from_config() {
        let config = SketchConfig::default();
        let pipeline = config.filter_pipeline();
        assert_eq!(pipeline.len(), 3);
        let stroke = Stroke::from_triples(&[(0.0, 0.0, 0), (0.0, 0.0, 5), (100.0, 0.0, 10)]);
        let out = pipeline.apply(&stroke).unwrap();
        assert!(out.first().unwrap().x.abs() < f64::EPSILON);
        assert!((out.last().unwrap().x - 100.0).abs() < f64::EPSILON);
        assert!(out.vertex_count() > 2);
    }

    #[test]
    fn test_line_recognition_runs_dehook_from_config() {
        let stroke = hooked_line();
        let config = SketchConfig::default();
        assert!((line_confidence(&config, &stroke) - 1.0).abs() < 1e-9);

        let raw = LineRecognizer::new().recognize(&stroke);
        assert!(raw.best().unwrap().confidence < 0.95);

        let mut lenient = SketchConfig::default();
        lenient.dehook.angle_threshold_deg = 180.0;
        assert!(line_confidence(&lenient, &stroke) < 0.95);
    }

    #[test]
    fn test_pan_recognizer_uses_configured_threshold() {
        let config = SketchConfig::default();
        assert_eq!(pan_state(&config), ModedState::Action);

        let strict = SketchConfig::from_json(r#"{ "pan": { "min_confidence": 0.96 } }"#).unwrap();
        assert_eq!(pan_state(&strict), ModedState::Unknown);
    }

    #[test]
    fn test_zoom_recognizer_uses_configured_signal() {
        let config = SketchConfig::default();
        let mut zoom = config.zoom_recognizer(LetterP(0.95));
        let mut stroke = Stroke::new();
        stroke.push(TimedPoint::new(0.0, 0.0, 0));
        zoom.stroke_started(&stroke).unwrap();
        for i in 1..12u32 {
            stroke.push(TimedPoint::new(0.0, f64::from(i), u64::from(i) * 10));
            zoom.stroke_modified(&stroke).unwrap();
        }
        // "P" is not the zoom signal.
        assert_eq!(zoom.state(), ModedState::Unknown);
    }
}
