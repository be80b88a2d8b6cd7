//! Error types for sketch recognition.
//!
//! Only genuine precondition or invariant violations are errors. A stroke
//! or session that simply "isn't a line" or "isn't a polygon" is reported
//! through confidence values and empty results, never through this type.

use thiserror::Error;

use crate::element::ElementId;
use crate::recognizer::ModedState;

/// Result type for sketch operations.
pub type SketchResult<T> = Result<T, SketchError>;

/// Errors that can occur in sketch operations.
#[derive(Debug, Error)]
pub enum SketchError {
    /// A filter ran out of samples before producing its output.
    #[error("Not enough points: needed {needed}, found {found}")]
    NotEnoughPoints {
        /// Number of samples the operation required.
        needed: usize,
        /// Number of samples that were available.
        found: usize,
    },

    /// A moded recognizer received an event its current state forbids.
    #[error("Invalid transition: {event} while {state:?}")]
    InvalidTransition {
        /// State the machine was in.
        state: ModedState,
        /// Lifecycle event that was delivered.
        event: &'static str,
    },

    /// A filter or recognizer was configured with an unusable parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Element not found in scene.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// Invalid scene operation.
    #[error("Invalid operation on element: {0}")]
    InvalidOperation(String),

    /// Configuration serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
