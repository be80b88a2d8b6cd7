//! In-memory scene: the forest of strokes and their interpretations.
//!
//! Elements live in an arena addressed by [`ElementId`]. Strokes are leaves;
//! composites and choices are interior nodes referencing children by
//! handle, and every element keeps a list of its parents. Each element also
//! records its *support*, the set of stroke ordinals it covers, which drives
//! the consistency and coverage queries.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::data::{DataType, TypedData};
use crate::element::{
    Alternative, ChoiceElement, CompositeElement, Element, ElementId, ElementKind, NamedChild,
    StrokeElement,
};
use crate::error::{SketchError, SketchResult};
use crate::stroke::{Stroke, TimedPoint};

/// A mutable interpretation forest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    elements: Vec<Option<Element>>,
    strokes: Vec<ElementId>,
    #[serde(skip)]
    next_ordinal: u32,
    #[serde(skip)]
    deleted_strokes: BTreeSet<u32>,
    #[serde(skip)]
    type_index: HashMap<DataType, Vec<ElementId>>,
    #[serde(skip)]
    choice_index: HashMap<DataType, Vec<ElementId>>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an element.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        usize::try_from(id.raw())
            .ok()
            .and_then(|i| self.elements.get(i))
            .and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        usize::try_from(id.raw())
            .ok()
            .and_then(|i| self.elements.get_mut(i))
            .and_then(Option::as_mut)
    }

    fn take(&mut self, id: ElementId) -> Option<Element> {
        usize::try_from(id.raw())
            .ok()
            .and_then(|i| self.elements.get_mut(i))
            .and_then(Option::take)
    }

    fn require(&self, id: ElementId) -> SketchResult<&Element> {
        self.get(id).ok_or(SketchError::ElementNotFound(id))
    }

    /// Whether `id` refers to a live element.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    fn insert(&mut self, element: Element) -> ElementId {
        let id = ElementId::from_raw(self.elements.len() as u64);
        self.elements.push(Some(element));
        id
    }

    /// Record a new stroke leaf.
    pub fn add_stroke(&mut self, stroke: Stroke) -> ElementId {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        let id = self.insert(Element::new(
            ElementKind::Stroke(StrokeElement { stroke }),
            BTreeSet::from([ordinal]),
        ));
        self.strokes.push(id);
        tracing::trace!(%id, ordinal, "stroke added");
        id
    }

    /// Append a sample to a stroke that is still being drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is missing or is not a stroke.
    pub fn extend_stroke(&mut self, id: ElementId, point: TimedPoint) -> SketchResult<()> {
        match self.get_mut(id).map(|e| &mut e.kind) {
            Some(ElementKind::Stroke(s)) => {
                s.stroke.push(point);
                Ok(())
            }
            Some(_) => Err(SketchError::InvalidOperation(format!(
                "{id} is not a stroke"
            ))),
            None => Err(SketchError::ElementNotFound(id)),
        }
    }

    /// Stroke content of a leaf.
    #[must_use]
    pub fn stroke(&self, id: ElementId) -> Option<&Stroke> {
        self.get(id).and_then(Element::as_stroke)
    }

    /// Composite content of an element.
    #[must_use]
    pub fn composite(&self, id: ElementId) -> Option<&CompositeElement> {
        self.get(id).and_then(Element::as_composite)
    }

    /// Choice content of an element.
    #[must_use]
    pub fn choice(&self, id: ElementId) -> Option<&ChoiceElement> {
        self.get(id).and_then(Element::as_choice)
    }

    /// Add a composite interpretation over existing elements.
    ///
    /// `children` are `(name, element)` pairs in order.
    ///
    /// # Errors
    ///
    /// Returns an error if `children` is empty or any child is missing.
    pub fn add_composite(
        &mut self,
        data: TypedData,
        confidence: f64,
        children: Vec<(String, ElementId)>,
    ) -> SketchResult<ElementId> {
        if children.is_empty() {
            return Err(SketchError::InvalidOperation(
                "composite needs at least one child".to_string(),
            ));
        }
        let mut support = BTreeSet::new();
        for (_, child) in &children {
            support.extend(self.require(*child)?.support.iter().copied());
        }
        let data_type = data.data_type();
        let children: Vec<NamedChild> = children
            .into_iter()
            .map(|(name, element)| NamedChild { name, element })
            .collect();
        let child_ids: Vec<ElementId> = children.iter().map(|c| c.element).collect();
        let id = self.insert(Element::new(
            ElementKind::Composite(CompositeElement {
                data,
                confidence,
                children,
            }),
            support,
        ));
        for child in child_ids {
            self.set_parent(id, child);
        }
        self.type_index.entry(data_type.clone()).or_default().push(id);
        tracing::trace!(%id, data_type = %data_type, confidence, "composite added");
        Ok(id)
    }

    /// Offer `child` as one alternative interpretation of type `data`.
    ///
    /// A choice with equal data over the same strokes is reused; otherwise a
    /// new choice is created. Returns the choice's handle.
    ///
    /// # Errors
    ///
    /// Returns an error if `child` is missing or is a stroke.
    pub fn add_choice(
        &mut self,
        data: TypedData,
        confidence: f64,
        child: ElementId,
        name: impl Into<String>,
    ) -> SketchResult<ElementId> {
        let element = self.require(child)?;
        if element.is_stroke() {
            return Err(SketchError::InvalidOperation(format!(
                "choice alternative {child} must be an interpretation"
            )));
        }
        let support = element.support.clone();
        let alternative = Alternative {
            confidence,
            element: child,
            name: name.into(),
        };
        let data_type = data.data_type();

        let existing = self
            .choice_index
            .get(&data_type)
            .into_iter()
            .flatten()
            .copied()
            .find(|&id| {
                self.get(id)
                    .is_some_and(|e| e.support == support && e.data() == Some(&data))
            });
        if let Some(id) = existing {
            if let Some(ElementKind::Choice(choice)) = self.get_mut(id).map(|e| &mut e.kind) {
                choice.insert(alternative);
            }
            self.set_parent(id, child);
            return Ok(id);
        }

        let id = self.insert(Element::new(
            ElementKind::Choice(ChoiceElement::new(data, alternative)),
            support,
        ));
        self.set_parent(id, child);
        self.type_index.entry(data_type.clone()).or_default().push(id);
        self.choice_index.entry(data_type).or_default().push(id);
        Ok(id)
    }

    /// Select alternative `which` of a choice.
    ///
    /// # Errors
    ///
    /// Returns an error if `choice` is not a live choice or `which` is out
    /// of range.
    pub fn set_choice(&mut self, choice: ElementId, which: usize) -> SketchResult<()> {
        match self.get_mut(choice).map(|e| &mut e.kind) {
            Some(ElementKind::Choice(c)) => {
                if c.select(which) {
                    Ok(())
                } else {
                    Err(SketchError::InvalidParameter(format!(
                        "choice {choice} has no alternative {which}"
                    )))
                }
            }
            Some(_) => Err(SketchError::InvalidOperation(format!(
                "{choice} is not a choice"
            ))),
            None => Err(SketchError::ElementNotFound(choice)),
        }
    }

    fn set_parent(&mut self, parent: ElementId, child: ElementId) {
        if let Some(c) = self.get_mut(child) {
            if !c.parents.contains(&parent) {
                c.parents.push(parent);
            }
        }
    }

    /// Remove an element and everything that depends on it.
    ///
    /// Every composite parent is removed recursively. A choice parent only
    /// loses the alternative and is removed once it has none left. Removed
    /// strokes stay counted as covered by [`Scene::is_covering_all`].
    /// Returns the handles of all removed elements, `id` first.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a live element.
    pub fn remove_element(&mut self, id: ElementId) -> SketchResult<Vec<ElementId>> {
        self.require(id)?;
        let mut removed = Vec::new();
        self.remove_cascade(id, &mut removed);
        tracing::debug!(%id, cascade = removed.len(), "element removed");
        Ok(removed)
    }

    fn remove_cascade(&mut self, id: ElementId, removed: &mut Vec<ElementId>) {
        let Some(element) = self.take(id) else {
            return;
        };
        removed.push(id);

        for child in element.children() {
            if let Some(c) = self.get_mut(child) {
                c.parents.retain(|&p| p != id);
            }
        }
        match &element.kind {
            ElementKind::Stroke(_) => {
                self.strokes.retain(|&s| s != id);
                self.deleted_strokes.extend(element.support.iter().copied());
            }
            ElementKind::Composite(c) => Self::unindex(&mut self.type_index, &c.data, id),
            ElementKind::Choice(c) => {
                Self::unindex(&mut self.type_index, &c.data, id);
                Self::unindex(&mut self.choice_index, &c.data, id);
            }
        }

        for parent in element.parents {
            let emptied = match self.get_mut(parent).map(|e| &mut e.kind) {
                Some(ElementKind::Choice(choice)) => {
                    choice.remove(id);
                    choice.alternatives().is_empty()
                }
                Some(_) => true,
                None => false,
            };
            if emptied {
                self.remove_cascade(parent, removed);
            }
        }
    }

    fn unindex(index: &mut HashMap<DataType, Vec<ElementId>>, data: &TypedData, id: ElementId) {
        if let Some(list) = index.get_mut(&data.data_type()) {
            list.retain(|&e| e != id);
        }
    }

    /// Interior elements of `data_type` whose strokes are disjoint from
    /// `consistent_with` (all of them when `None`), in insertion order.
    #[must_use]
    pub fn elements_of_type(
        &self,
        data_type: &DataType,
        consistent_with: Option<ElementId>,
    ) -> Vec<ElementId> {
        self.type_index
            .get(data_type)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&e| self.is_consistent(Some(e), consistent_with))
            .collect()
    }

    /// Parentless interpretations, highest confidence first.
    #[must_use]
    pub fn roots(&self) -> Vec<ElementId> {
        let mut roots: Vec<(ElementId, f64)> = self
            .live()
            .filter(|(_, e)| !e.is_stroke() && e.parents.is_empty())
            .map(|(id, e)| (id, e.confidence().unwrap_or(0.0)))
            .collect();
        roots.sort_by(|a, b| b.1.total_cmp(&a.1));
        roots.into_iter().map(|(id, _)| id).collect()
    }

    /// Live stroke leaves in recording order.
    #[must_use]
    pub fn strokes(&self) -> &[ElementId] {
        &self.strokes
    }

    /// Choices that still offer more than one alternative.
    #[must_use]
    pub fn choices(&self) -> Vec<ElementId> {
        let mut out: Vec<ElementId> = self
            .choice_index
            .values()
            .flatten()
            .copied()
            .filter(|&id| self.choice(id).is_some_and(|c| c.alternatives().len() > 1))
            .collect();
        out.sort_unstable();
        out
    }

    /// Parents of an element (empty if it is missing).
    #[must_use]
    pub fn parents(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map_or(&[], Element::parents)
    }

    /// Children of an element (empty for strokes and missing elements).
    #[must_use]
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.get(id).map(Element::children).unwrap_or_default()
    }

    /// Whether `id` is a root interpretation covering every stroke that
    /// has not been deleted.
    #[must_use]
    pub fn is_covering_all(&self, id: ElementId) -> bool {
        let Some(element) = self.get(id) else {
            return false;
        };
        if element.is_stroke() || !element.parents.is_empty() {
            return false;
        }
        (0..self.next_ordinal)
            .all(|o| element.support.contains(&o) || self.deleted_strokes.contains(&o))
    }

    /// Whether two elements cover disjoint strokes. `None` is consistent
    /// with everything.
    #[must_use]
    pub fn is_consistent(&self, a: Option<ElementId>, b: Option<ElementId>) -> bool {
        let (Some(a), Some(b)) = (a.and_then(|a| self.get(a)), b.and_then(|b| self.get(b)))
        else {
            return true;
        };
        a.support.is_disjoint(&b.support)
    }

    /// Whether two elements cover exactly the same strokes.
    #[must_use]
    pub fn same_support(&self, a: ElementId, b: ElementId) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => a.support == b.support,
            _ => false,
        }
    }

    /// Accept `id` as the interpretation of its strokes.
    ///
    /// Every parent of an element in the subtree of `id` that is not itself
    /// part of that subtree is removed. With `make_choices`, only the
    /// selected alternative of each choice is kept. Returns removed handles.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is missing or is a stroke.
    pub fn confirm(&mut self, id: ElementId, make_choices: bool) -> SketchResult<Vec<ElementId>> {
        if self.require(id)?.is_stroke() {
            return Err(SketchError::InvalidOperation(format!(
                "cannot confirm stroke {id}"
            )));
        }
        let mut marked = HashSet::new();
        self.mark_subtree(id, make_choices, &mut marked);
        let mut removed = Vec::new();
        self.confirm_subtree(id, &marked, &mut removed);
        tracing::debug!(%id, removed = removed.len(), "interpretation confirmed");
        Ok(removed)
    }

    fn mark_subtree(&self, id: ElementId, make_choices: bool, marked: &mut HashSet<ElementId>) {
        let Some(element) = self.get(id) else {
            return;
        };
        marked.insert(id);
        let next: Vec<ElementId> = match &element.kind {
            ElementKind::Choice(c) if make_choices => {
                c.selected().map(|a| a.element).into_iter().collect()
            }
            _ => element.children(),
        };
        for child in next {
            self.mark_subtree(child, make_choices, marked);
        }
    }

    fn confirm_subtree(
        &mut self,
        id: ElementId,
        marked: &HashSet<ElementId>,
        removed: &mut Vec<ElementId>,
    ) {
        let children = self.children(id);
        if !marked.contains(&id) {
            self.remove_cascade(id, removed);
        }
        for child in children {
            let stale: Vec<ElementId> = self
                .parents(child)
                .iter()
                .copied()
                .filter(|p| !marked.contains(p))
                .collect();
            for parent in stale {
                self.remove_cascade(parent, removed);
            }
            if self.get(child).is_some_and(|e| !e.is_stroke()) {
                self.confirm_subtree(child, marked, removed);
            }
        }
    }

    /// Number of live composites and choices.
    #[must_use]
    pub fn composite_count(&self) -> usize {
        self.live().filter(|(_, e)| !e.is_stroke()).count()
    }

    /// Number of live strokes.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// All live elements with their handles.
    pub fn live(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (ElementId::from_raw(i as u64), e)))
    }

    /// Serialize the live elements to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> SketchResult<String> {
        let live: Vec<(ElementId, &Element)> = self.live().collect();
        serde_json::to_string_pretty(&live).map_err(SketchError::Serialization)
    }
}
