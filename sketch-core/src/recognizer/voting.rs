//! Fan-out of lifecycle events to several recognizers.

use std::collections::HashMap;

use super::StrokeRecognizer;
use crate::data::DataType;
use crate::error::SketchResult;
use crate::recognition::{Recognition, RecognitionSet};
use crate::stroke::Stroke;

/// Combines the per-child results of one event into a single set.
pub trait Aggregator {
    /// Merge child results, given in registration order.
    fn aggregate(&self, results: Vec<RecognitionSet>) -> RecognitionSet;
}

/// Keeps the highest-confidence candidate of each type across all children.
///
/// If every child returned [`RecognitionSet::NO_RECOGNITION`], so does the
/// aggregate.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionAggregator;

impl Aggregator for UnionAggregator {
    fn aggregate(&self, results: Vec<RecognitionSet>) -> RecognitionSet {
        if results.iter().all(RecognitionSet::is_no_recognition) {
            return RecognitionSet::NO_RECOGNITION;
        }
        let mut best: HashMap<DataType, Recognition> = HashMap::new();
        let mut order: Vec<DataType> = Vec::new();
        for r in results.iter().flat_map(RecognitionSet::iter) {
            let key = r.data_type();
            match best.get(&key) {
                Some(existing) if existing.confidence >= r.confidence => {}
                Some(_) => {
                    best.insert(key, r.clone());
                }
                None => {
                    order.push(key.clone());
                    best.insert(key, r.clone());
                }
            }
        }
        RecognitionSet::from_recognitions(order.into_iter().filter_map(|k| best.remove(&k)))
    }
}

/// Forwards every event to each child exactly once, in registration order,
/// then aggregates.
///
/// Children only ever see the stroke, never each other's results.
pub struct VotingRecognizer<A = UnionAggregator> {
    children: Vec<Box<dyn StrokeRecognizer>>,
    aggregator: A,
}

impl VotingRecognizer<UnionAggregator> {
    /// Create an empty voter with the union aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_aggregator(UnionAggregator)
    }
}

impl Default for VotingRecognizer<UnionAggregator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Aggregator> VotingRecognizer<A> {
    /// Create an empty voter with a custom aggregation policy.
    #[must_use]
    pub fn with_aggregator(aggregator: A) -> Self {
        Self {
            children: Vec::new(),
            aggregator,
        }
    }

    /// Register a child recognizer.
    #[must_use]
    pub fn with<R: StrokeRecognizer + 'static>(mut self, child: R) -> Self {
        self.push(child);
        self
    }

    /// Register a child recognizer.
    pub fn push<R: StrokeRecognizer + 'static>(&mut self, child: R) {
        self.children.push(Box::new(child));
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn vote<F>(&mut self, stroke: &Stroke, mut call: F) -> SketchResult<RecognitionSet>
    where
        F: FnMut(&mut dyn StrokeRecognizer, &Stroke) -> SketchResult<RecognitionSet>,
    {
        let results = self
            .children
            .iter_mut()
            .map(|child| call(child.as_mut(), stroke))
            .collect::<SketchResult<Vec<_>>>()?;
        Ok(self.aggregator.aggregate(results))
    }
}

impl<A> std::fmt::Debug for VotingRecognizer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VotingRecognizer")
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl<A: Aggregator> StrokeRecognizer for VotingRecognizer<A> {
    fn stroke_started(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        self.vote(stroke, |r, s| r.stroke_started(s))
    }

    fn stroke_modified(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        self.vote(stroke, |r, s| r.stroke_modified(s))
    }

    fn stroke_completed(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        self.vote(stroke, |r, s| r.stroke_completed(s))
    }
}
