//! Typed interpretation payloads.
//!
//! Every interpretation a recognizer produces carries a [`TypedData`]. The
//! variant is the semantic type; [`TypedData::data_type`] gives the stable
//! identity used for scene indexing and type queries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Stable type identity of a [`TypedData`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// A straight line.
    Line,
    /// A closed polygon made of line strokes.
    Polygon,
    /// A path drawn as a series of dashes.
    DashedPath,
    /// A scribble (zig-zag erase mark).
    Scribble,
    /// A continuous pan gesture.
    Pan,
    /// A continuous zoom gesture.
    Zoom,
    /// The running aggregate of lowest-level results.
    LlrSet,
    /// A free-form classifier label.
    Label(String),
}

impl DataType {
    /// Stable type id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Line => "line",
            Self::Polygon => "polygon",
            Self::DashedPath => "dashed_path",
            Self::Scribble => "scribble",
            Self::Pan => "pan",
            Self::Zoom => "zoom",
            Self::LlrSet => "llr_rec",
            Self::Label(id) => id,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of an interpretation.
///
/// Two values are equal iff they are the same variant with equal fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum TypedData {
    /// A straight segment between two points.
    Line {
        /// Start of the segment.
        start: Point,
        /// End of the segment.
        end: Point,
    },

    /// A closed polygon.
    Polygon {
        /// Vertices in traversal order.
        vertices: Vec<Point>,
    },

    /// A dashed path.
    DashedPath {
        /// Simplified path through the dash endpoints.
        path: Vec<Point>,
        /// Mean dash length.
        avg_segment_len: f64,
        /// Mean gap between consecutive dashes.
        avg_gap_len: f64,
    },

    /// A scribble.
    Scribble,

    /// Incremental pan delta.
    Pan {
        /// Horizontal displacement.
        dx: f64,
        /// Vertical displacement.
        dy: f64,
    },

    /// Incremental zoom factor.
    Zoom {
        /// Multiplicative scale (1.0 = unchanged).
        scale: f64,
    },

    /// Aggregate of every stroke's best single-stroke interpretation.
    LlrSet,

    /// A label from a generic classifier.
    Label {
        /// Classifier type id.
        type_id: String,
    },
}

impl TypedData {
    /// Convenience constructor for a classifier label.
    #[must_use]
    pub fn label(type_id: impl Into<String>) -> Self {
        Self::Label {
            type_id: type_id.into(),
        }
    }

    /// Semantic type of this payload.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Line { .. } => DataType::Line,
            Self::Polygon { .. } => DataType::Polygon,
            Self::DashedPath { .. } => DataType::DashedPath,
            Self::Scribble => DataType::Scribble,
            Self::Pan { .. } => DataType::Pan,
            Self::Zoom { .. } => DataType::Zoom,
            Self::LlrSet => DataType::LlrSet,
            Self::Label { type_id } => DataType::Label(type_id.clone()),
        }
    }

    /// Whether this payload is of type `data_type`.
    #[must_use]
    pub fn is_type(&self, data_type: &DataType) -> bool {
        match (self, data_type) {
            (Self::Label { type_id }, DataType::Label(other)) => type_id == other,
            _ => self.data_type() == *data_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ids_are_stable() {
        assert_eq!(DataType::LlrSet.as_str(), "llr_rec");
        assert_eq!(DataType::DashedPath.to_string(), "dashed_path");
        assert_eq!(TypedData::label("P").data_type().as_str(), "P");
    }

    #[test]
    fn test_equality_by_kind_and_payload() {
        let a = TypedData::Pan { dx: 1.0, dy: 2.0 };
        let b = TypedData::Pan { dx: 1.0, dy: 2.0 };
        let c = TypedData::Pan { dx: 1.0, dy: 3.0 };
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(TypedData::Scribble, TypedData::LlrSet);
        assert!(TypedData::label("Z").is_type(&DataType::Label("Z".to_string())));
        assert!(!TypedData::label("Z").is_type(&DataType::Label("P".to_string())));
    }

    #[test]
    fn test_serializes_with_tag() {
        let json = serde_json::to_value(TypedData::Zoom { scale: 2.0 }).unwrap();
        assert_eq!(json["type"], "zoom");
        assert_eq!(json["data"]["scale"], 2.0);

        let back: TypedData = serde_json::from_value(json).unwrap();
        assert_eq!(back, TypedData::Zoom { scale: 2.0 });
    }
}
