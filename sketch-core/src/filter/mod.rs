//! # Stroke Filters
//!
//! Independent, composable transforms over a stroke's samples. A filter
//! never mutates its input: it returns a new stroke (with a new identity).
//!
//! ```text
//! raw stroke ─► dedup ─► dehook ─► interpolate ─► approximate ─► recognizers
//! ```
//!
//! Filters are chained with [`FilterPipeline`]:
//!
//! ```
//! use sketch_core::filter::{ApproximateFilter, DedupFilter, FilterPipeline};
//! use sketch_core::Stroke;
//!
//! let pipeline = FilterPipeline::new()
//!     .then(DedupFilter)
//!     .then(ApproximateFilter::default());
//! let stroke = Stroke::from_triples(&[(0.0, 0.0, 0), (0.0, 0.0, 5), (10.0, 0.0, 10)]);
//! let out = pipeline.apply(&stroke).unwrap();
//! assert_eq!(out.vertex_count(), 2);
//! ```

mod approximate;
mod average;
mod dedup;
mod dehook;
mod interpolate;
mod resample;

pub use approximate::{ApproximateFilter, ApproximationConfig};
pub use average::AverageFilter;
pub use dedup::DedupFilter;
pub use dehook::{DehookConfig, DehookFilter};
pub use interpolate::{InterpolateConfig, InterpolateFilter};
pub use resample::{PointCountFilter, TimeStepConfig, TimeStepFilter};

use crate::error::SketchResult;
use crate::stroke::Stroke;

/// A transform from one stroke to a new stroke.
pub trait StrokeFilter {
    /// Apply the filter.
    ///
    /// # Errors
    ///
    /// Returns an error only when a hard precondition of the filter is
    /// violated (for example too few samples to resample by time).
    fn apply(&self, stroke: &Stroke) -> SketchResult<Stroke>;
}

/// An ordered chain of filters applied left to right.
#[derive(Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn StrokeFilter>>,
}

impl FilterPipeline {
    /// Create an empty pipeline (the identity transform).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter to the chain.
    #[must_use]
    pub fn then<F: StrokeFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of filters in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter in order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a filter in the chain.
    pub fn apply(&self, stroke: &Stroke) -> SketchResult<Stroke> {
        let mut current = Stroke::from_points(stroke.points().to_vec());
        for filter in &self.filters {
            current = filter.apply(&current)?;
        }
        Ok(current)
    }
}

impl std::fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl StrokeFilter for FilterPipeline {
    fn apply(&self, stroke: &Stroke) -> SketchResult<Stroke> {
        Self::apply(self, stroke)
    }
}
