//! Scene elements: stroke leaves and composite/choice interpretations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data::TypedData;
use crate::stroke::Stroke;

/// Stable handle of an element in a [`Scene`](crate::Scene).
///
/// Handles are never reused, so a handle to a removed element simply stops
/// resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(u64);

impl ElementId {
    /// Create from a raw arena index.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw arena index.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A child slot of a composite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedChild {
    /// Role of the child within the composite (e.g. `"edge0"`).
    pub name: String,
    /// The child element.
    pub element: ElementId,
}

/// Leaf element wrapping one pen stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeElement {
    /// The recorded stroke.
    pub stroke: Stroke,
}

/// Interior element: one typed interpretation of its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeElement {
    /// Interpretation payload.
    pub data: TypedData,
    /// Confidence on the `[0, 1]` scale.
    pub confidence: f64,
    /// Ordered, named children.
    pub children: Vec<NamedChild>,
}

impl CompositeElement {
    /// Child handle with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<ElementId> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.element)
    }
}

/// One alternative of a [`ChoiceElement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    /// Confidence of choosing this alternative.
    pub confidence: f64,
    /// The alternative composite.
    pub element: ElementId,
    /// Name of the alternative.
    pub name: String,
}

/// Interior element holding mutually exclusive interpretations of the same
/// strokes, ordered by descending confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceElement {
    /// Shared interpretation payload.
    pub data: TypedData,
    alternatives: Vec<Alternative>,
    which: usize,
}

impl ChoiceElement {
    pub(crate) fn new(data: TypedData, first: Alternative) -> Self {
        Self {
            data,
            alternatives: vec![first],
            which: 0,
        }
    }

    /// Alternatives in descending confidence order.
    #[must_use]
    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    /// Index of the selected alternative.
    #[must_use]
    pub const fn which(&self) -> usize {
        self.which
    }

    /// The selected alternative.
    #[must_use]
    pub fn selected(&self) -> Option<&Alternative> {
        self.alternatives.get(self.which)
    }

    /// Confidence of the selected alternative (0 when empty).
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.selected().map_or(0.0, |a| a.confidence)
    }

    /// Insert an alternative in confidence order and reselect the best.
    /// Returns `false` if `element` is already an alternative.
    pub(crate) fn insert(&mut self, alternative: Alternative) -> bool {
        if self
            .alternatives
            .iter()
            .any(|a| a.element == alternative.element)
        {
            return false;
        }
        let pos = self
            .alternatives
            .iter()
            .position(|a| alternative.confidence > a.confidence)
            .unwrap_or(self.alternatives.len());
        self.alternatives.insert(pos, alternative);
        self.which = 0;
        true
    }

    pub(crate) fn remove(&mut self, element: ElementId) {
        self.alternatives.retain(|a| a.element != element);
        self.which = 0;
    }

    pub(crate) fn select(&mut self, which: usize) -> bool {
        if which < self.alternatives.len() {
            self.which = which;
            true
        } else {
            false
        }
    }
}

/// The content of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ElementKind {
    /// A pen stroke leaf.
    Stroke(StrokeElement),
    /// A typed interpretation of its children.
    Composite(CompositeElement),
    /// Competing interpretations of the same strokes.
    Choice(ChoiceElement),
}

/// An element stored in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element content.
    pub kind: ElementKind,
    pub(crate) parents: Vec<ElementId>,
    pub(crate) support: BTreeSet<u32>,
}

impl Element {
    pub(crate) fn new(kind: ElementKind, support: BTreeSet<u32>) -> Self {
        Self {
            kind,
            parents: Vec::new(),
            support,
        }
    }

    /// Interior elements that reference this one.
    #[must_use]
    pub fn parents(&self) -> &[ElementId] {
        &self.parents
    }

    /// Ordinals of the strokes this element covers.
    #[must_use]
    pub const fn support(&self) -> &BTreeSet<u32> {
        &self.support
    }

    /// Whether this is a stroke leaf.
    #[must_use]
    pub const fn is_stroke(&self) -> bool {
        matches!(self.kind, ElementKind::Stroke(_))
    }

    /// Stroke content, if this is a leaf.
    #[must_use]
    pub const fn as_stroke(&self) -> Option<&Stroke> {
        match &self.kind {
            ElementKind::Stroke(s) => Some(&s.stroke),
            _ => None,
        }
    }

    /// Composite content, if this is a composite.
    #[must_use]
    pub const fn as_composite(&self) -> Option<&CompositeElement> {
        match &self.kind {
            ElementKind::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// Choice content, if this is a choice.
    #[must_use]
    pub const fn as_choice(&self) -> Option<&ChoiceElement> {
        match &self.kind {
            ElementKind::Choice(c) => Some(c),
            _ => None,
        }
    }

    /// Interpretation payload of an interior element.
    #[must_use]
    pub const fn data(&self) -> Option<&TypedData> {
        match &self.kind {
            ElementKind::Stroke(_) => None,
            ElementKind::Composite(c) => Some(&c.data),
            ElementKind::Choice(c) => Some(&c.data),
        }
    }

    /// Confidence of an interior element.
    #[must_use]
    pub fn confidence(&self) -> Option<f64> {
        match &self.kind {
            ElementKind::Stroke(_) => None,
            ElementKind::Composite(c) => Some(c.confidence),
            ElementKind::Choice(c) => Some(c.confidence()),
        }
    }

    /// Child handles: composite children, or every alternative of a choice.
    #[must_use]
    pub fn children(&self) -> Vec<ElementId> {
        match &self.kind {
            ElementKind::Stroke(_) => Vec::new(),
            ElementKind::Composite(c) => c.children.iter().map(|c| c.element).collect(),
            ElementKind::Choice(c) => c.alternatives.iter().map(|a| a.element).collect(),
        }
    }
}
