//! Runs a filter pipeline in front of a stroke recognizer.

use super::StrokeRecognizer;
use crate::error::SketchResult;
use crate::filter::FilterPipeline;
use crate::recognition::RecognitionSet;
use crate::stroke::Stroke;

/// Cleans every stroke with a [`FilterPipeline`] before the wrapped
/// recognizer sees it.
///
/// Filter output carries a fresh stroke identity, so place a
/// [`CachingRecognizer`](super::CachingRecognizer) outside this wrapper, not
/// inside it.
#[derive(Debug)]
pub struct FilteredRecognizer<R> {
    pipeline: FilterPipeline,
    target: R,
}

impl<R: StrokeRecognizer> FilteredRecognizer<R> {
    /// Wrap `target` behind `pipeline`.
    #[must_use]
    pub const fn new(pipeline: FilterPipeline, target: R) -> Self {
        Self { pipeline, target }
    }

    /// The filters applied to each stroke.
    #[must_use]
    pub const fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    /// The wrapped recognizer.
    #[must_use]
    pub const fn target(&self) -> &R {
        &self.target
    }
}

impl<R: StrokeRecognizer> StrokeRecognizer for FilteredRecognizer<R> {
    fn stroke_started(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        let filtered = self.pipeline.apply(stroke)?;
        self.target.stroke_started(&filtered)
    }

    fn stroke_modified(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        let filtered = self.pipeline.apply(stroke)?;
        self.target.stroke_modified(&filtered)
    }

    fn stroke_completed(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        let filtered = self.pipeline.apply(stroke)?;
        tracing::trace!(
            raw = stroke.vertex_count(),
            filtered = filtered.vertex_count(),
            "stroke filtered"
        );
        self.target.stroke_completed(&filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TypedData;
    use crate::filter::{DedupFilter, TimeStepFilter};

    /// Reports the vertex count it was handed as a confidence.
    struct VertexCount;

    impl StrokeRecognizer for VertexCount {
        fn stroke_completed(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
            #[allow(clippy::cast_precision_loss)]
            let n = stroke.vertex_count() as f64;
            Ok(RecognitionSet::single(TypedData::Scribble, n))
        }
    }

    #[test]
    fn test_target_sees_filtered_stroke() {
        let mut rec = FilteredRecognizer::new(FilterPipeline::new().then(DedupFilter), VertexCount);
        let stroke = Stroke::from_triples(&[(0.0, 0.0, 0), (0.0, 0.0, 5), (10.0, 0.0, 10)]);
        let set = rec.stroke_completed(&stroke).unwrap();
        assert!((set.best().unwrap().confidence - 2.0).abs() < f64::EPSILON);
        assert_eq!(rec.pipeline().len(), 1);
    }

    #[test]
    fn test_filter_errors_propagate() {
        let pipeline = FilterPipeline::new().then(TimeStepFilter::default());
        let mut rec = FilteredRecognizer::new(pipeline, VertexCount);
        assert!(rec.stroke_completed(&Stroke::new()).is_err());
    }
}
