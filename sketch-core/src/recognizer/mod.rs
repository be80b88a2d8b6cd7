//! # Stroke Recognizers
//!
//! Classify a single in-progress or finished stroke into ranked, typed
//! interpretations. Each callback mirrors a pointer lifecycle event:
//!
//! ```text
//! pen down ─► stroke_started
//! pen move ─► stroke_modified   (zero or more)
//! pen up   ─► stroke_completed  (exactly once)
//! ```
//!
//! Primitive recognizers ([`LineRecognizer`], [`ScribbleRecognizer`]) are
//! composed with wrappers: [`CachingRecognizer`] skips re-recognition of an
//! unchanged stroke, [`FilteredRecognizer`] cleans strokes with a filter
//! pipeline first, [`VotingRecognizer`] fans events out to several
//! children, and [`ModedRecognizer`] drives continuous gestures
//! ([`PanAction`], [`ZoomAction`]) through an idle/unknown/action cycle.

mod cache;
mod filtered;
mod gesture;
mod line;
mod moded;
mod scribble;
mod voting;

pub use cache::CachingRecognizer;
pub use filtered::FilteredRecognizer;
pub use gesture::{ActionConfig, PanAction, ZoomAction, ZoomConfig};
pub use line::{LineConfig, LineRecognizer};
pub use moded::{ActionRecognizer, ModedRecognizer, ModedState};
pub use scribble::{ScribbleConfig, ScribbleRecognizer};
pub use voting::{Aggregator, UnionAggregator, VotingRecognizer};

use crate::error::SketchResult;
use crate::recognition::RecognitionSet;
use crate::stroke::Stroke;

/// Lifecycle callbacks of a single-stroke recognizer.
///
/// Callbacks a recognizer does not care about return
/// [`RecognitionSet::NO_RECOGNITION`]. Errors are reserved for invariant
/// violations; "this is not a line" is expressed through confidence.
pub trait StrokeRecognizer {
    /// Called once when the pen goes down.
    ///
    /// # Errors
    ///
    /// Returns an error if the recognizer's internal state forbids a new stroke.
    fn stroke_started(&mut self, _stroke: &Stroke) -> SketchResult<RecognitionSet> {
        Ok(RecognitionSet::NO_RECOGNITION)
    }

    /// Called whenever samples are appended to the stroke.
    ///
    /// # Errors
    ///
    /// Returns an error on an internal invariant violation.
    fn stroke_modified(&mut self, _stroke: &Stroke) -> SketchResult<RecognitionSet> {
        Ok(RecognitionSet::NO_RECOGNITION)
    }

    /// Called once when the pen goes up.
    ///
    /// # Errors
    ///
    /// Returns an error on an internal invariant violation.
    fn stroke_completed(&mut self, _stroke: &Stroke) -> SketchResult<RecognitionSet> {
        Ok(RecognitionSet::NO_RECOGNITION)
    }
}

impl<R: StrokeRecognizer + ?Sized> StrokeRecognizer for Box<R> {
    fn stroke_started(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        (**self).stroke_started(stroke)
    }

    fn stroke_modified(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        (**self).stroke_modified(stroke)
    }

    fn stroke_completed(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        (**self).stroke_completed(stroke)
    }
}
