//! Caching proxy around a stroke recognizer.

use super::StrokeRecognizer;
use crate::error::SketchResult;
use crate::recognition::RecognitionSet;
use crate::stroke::{Stroke, StrokeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Started,
    Modified,
    Completed,
}

/// Identity + length key. Content is never hashed: the stroke id is unique
/// per gesture and strokes are append-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    event: Event,
    stroke: StrokeId,
    vertex_count: usize,
}

impl CacheKey {
    fn new(event: Event, stroke: &Stroke) -> Self {
        Self {
            event,
            stroke: stroke.id(),
            vertex_count: stroke.vertex_count(),
        }
    }
}

/// Re-invokes the wrapped recognizer only when the stroke changed.
///
/// A stroke is unchanged when it has the same identity and vertex count as
/// the last one seen for the same lifecycle event.
#[derive(Debug, Clone)]
pub struct CachingRecognizer<R> {
    target: R,
    last: Option<(CacheKey, RecognitionSet)>,
}

impl<R: StrokeRecognizer> CachingRecognizer<R> {
    /// Wrap `target`.
    #[must_use]
    pub const fn new(target: R) -> Self {
        Self { target, last: None }
    }

    /// The wrapped recognizer.
    #[must_use]
    pub const fn target(&self) -> &R {
        &self.target
    }

    /// Forget the cached result.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    fn cached<F>(&mut self, event: Event, stroke: &Stroke, call: F) -> SketchResult<RecognitionSet>
    where
        F: FnOnce(&mut R, &Stroke) -> SketchResult<RecognitionSet>,
    {
        let key = CacheKey::new(event, stroke);
        if let Some((last_key, set)) = &self.last {
            if *last_key == key {
                tracing::trace!(stroke = %key.stroke, "recognition cache hit");
                return Ok(set.clone());
            }
        }
        let set = call(&mut self.target, stroke)?;
        self.last = Some((key, set.clone()));
        Ok(set)
    }
}

impl<R: StrokeRecognizer> StrokeRecognizer for CachingRecognizer<R> {
    fn stroke_started(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        self.cached(Event::Started, stroke, R::stroke_started)
    }

    fn stroke_modified(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        self.cached(Event::Modified, stroke, R::stroke_modified)
    }

    fn stroke_completed(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        self.cached(Event::Completed, stroke, R::stroke_completed)
    }
}
