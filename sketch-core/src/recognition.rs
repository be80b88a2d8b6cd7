//! Ranked, confidence-scored stroke interpretations.

use serde::{Deserialize, Serialize};

use crate::data::{DataType, TypedData};

/// One candidate interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    /// Interpretation payload.
    pub data: TypedData,
    /// Confidence on the canonical `[0, 1]` scale.
    pub confidence: f64,
}

impl Recognition {
    /// Create a new recognition.
    #[must_use]
    pub const fn new(data: TypedData, confidence: f64) -> Self {
        Self { data, confidence }
    }

    /// Semantic type of the payload.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }
}

/// Candidate interpretations of one stroke at one point in its lifecycle.
///
/// Kept sorted by descending confidence. [`RecognitionSet::NO_RECOGNITION`]
/// means the recognizer had nothing to say about the event, which is
/// distinct from an allocated set that happens to be empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecognitionSet {
    recognitions: Option<Vec<Recognition>>,
}

impl RecognitionSet {
    /// Sentinel for "this event produced no recognition".
    pub const NO_RECOGNITION: Self = Self { recognitions: None };

    /// Create an empty, allocated set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            recognitions: Some(Vec::new()),
        }
    }

    /// Create a set from candidates in any order.
    #[must_use]
    pub fn from_recognitions(recognitions: impl IntoIterator<Item = Recognition>) -> Self {
        let mut set = Self::new();
        for r in recognitions {
            set.add(r);
        }
        set
    }

    /// Create a set with a single candidate.
    #[must_use]
    pub fn single(data: TypedData, confidence: f64) -> Self {
        Self::from_recognitions([Recognition::new(data, confidence)])
    }

    /// Insert a candidate, keeping descending confidence order.
    ///
    /// Adding to [`RecognitionSet::NO_RECOGNITION`] turns it into a real set.
    pub fn add(&mut self, recognition: Recognition) {
        let list = self.recognitions.get_or_insert_with(Vec::new);
        let pos = list
            .iter()
            .position(|r| recognition.confidence > r.confidence)
            .unwrap_or(list.len());
        list.insert(pos, recognition);
    }

    /// Whether this is the "no recognition" sentinel.
    #[must_use]
    pub const fn is_no_recognition(&self) -> bool {
        self.recognitions.is_none()
    }

    /// Whether there are no candidates (sentinel or allocated-empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recognitions.as_ref().is_none_or(Vec::is_empty)
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recognitions.as_ref().map_or(0, Vec::len)
    }

    /// Highest-confidence candidate.
    #[must_use]
    pub fn best(&self) -> Option<&Recognition> {
        self.recognitions.as_ref().and_then(|l| l.first())
    }

    /// Best candidate of the given type.
    #[must_use]
    pub fn best_of_type(&self, data_type: &DataType) -> Option<&Recognition> {
        self.iter().find(|r| r.data.is_type(data_type))
    }

    /// Candidates in descending confidence order.
    pub fn iter(&self) -> std::slice::Iter<'_, Recognition> {
        self.recognitions.as_deref().unwrap_or(&[]).iter()
    }
}

impl<'a> IntoIterator for &'a RecognitionSet {
    type Item = &'a Recognition;
    type IntoIter = std::slice::Iter<'a, Recognition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_differs_from_empty_set() {
        let none = RecognitionSet::NO_RECOGNITION;
        let empty = RecognitionSet::new();
        assert!(none.is_no_recognition());
        assert!(!empty.is_no_recognition());
        assert!(none.is_empty() && empty.is_empty());
        assert_ne!(none, empty);
    }

    #[test]
    fn test_best_is_highest_confidence() {
        let set = RecognitionSet::from_recognitions([
            Recognition::new(TypedData::Scribble, 0.4),
            Recognition::new(TypedData::label("P"), 0.9),
            Recognition::new(TypedData::label("Z"), 0.6),
        ]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.best().unwrap().data, TypedData::label("P"));
        let confidences: Vec<f64> = set.iter().map(|r| r.confidence).collect();
        assert_eq!(confidences, vec![0.9, 0.6, 0.4]);
    }

    #[test]
    fn test_best_of_type() {
        let set = RecognitionSet::from_recognitions([
            Recognition::new(TypedData::label("P"), 0.9),
            Recognition::new(TypedData::Scribble, 0.4),
        ]);
        assert!(set.best_of_type(&DataType::Scribble).is_some());
        assert!(set.best_of_type(&DataType::Line).is_none());
    }

    #[test]
    fn test_add_to_sentinel_allocates() {
        let mut set = RecognitionSet::NO_RECOGNITION;
        set.add(Recognition::new(TypedData::Scribble, 0.5));
        assert!(!set.is_no_recognition());
        assert_eq!(set.len(), 1);
    }
}
