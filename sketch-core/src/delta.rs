//! Records of scene changes made by scene recognizers.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;

/// One change: an interpretation added, possibly superseding others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDelta {
    /// Elements removed to make way for `added`, cascades included.
    pub removed: Vec<ElementId>,
    /// The new interpretation.
    pub added: ElementId,
}

impl SceneDelta {
    /// A purely additive change.
    #[must_use]
    pub const fn additive(added: ElementId) -> Self {
        Self {
            removed: Vec::new(),
            added,
        }
    }

    /// A change that removes `removed` and then adds `added`.
    #[must_use]
    pub const fn replacing(removed: Vec<ElementId>, added: ElementId) -> Self {
        Self { removed, added }
    }

    /// Whether nothing was removed.
    #[must_use]
    pub fn is_additive(&self) -> bool {
        self.removed.is_empty()
    }
}

/// The changes one event produced.
///
/// [`SceneDeltaSet::NO_DELTA`] means nothing changed, so callers can skip
/// work; it is distinct from an allocated but empty set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneDeltaSet {
    deltas: Option<Vec<SceneDelta>>,
}

impl SceneDeltaSet {
    /// Sentinel for "the scene did not change".
    pub const NO_DELTA: Self = Self { deltas: None };

    /// Create an empty, allocated set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            deltas: Some(Vec::new()),
        }
    }

    /// Set holding one change.
    #[must_use]
    pub fn single(delta: SceneDelta) -> Self {
        Self {
            deltas: Some(vec![delta]),
        }
    }

    /// Whether this is the "no change" sentinel.
    #[must_use]
    pub const fn is_no_delta(&self) -> bool {
        self.deltas.is_none()
    }

    /// Number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deltas.as_ref().map_or(0, Vec::len)
    }

    /// Whether there are no changes (sentinel or allocated-empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a change. Pushing onto the sentinel allocates.
    pub fn push(&mut self, delta: SceneDelta) {
        self.deltas.get_or_insert_with(Vec::new).push(delta);
    }

    /// Append every change of `other`. Merging the sentinel is a no-op.
    pub fn merge(&mut self, other: Self) {
        if let Some(deltas) = other.deltas {
            self.deltas.get_or_insert_with(Vec::new).extend(deltas);
        }
    }

    /// Changes in the order they were applied.
    pub fn iter(&self) -> std::slice::Iter<'_, SceneDelta> {
        self.deltas.as_deref().unwrap_or(&[]).iter()
    }

    /// Handles of every added interpretation.
    #[must_use]
    pub fn added(&self) -> Vec<ElementId> {
        self.iter().map(|d| d.added).collect()
    }
}

impl<'a> IntoIterator for &'a SceneDeltaSet {
    type Item = &'a SceneDelta;
    type IntoIter = std::slice::Iter<'a, SceneDelta>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
