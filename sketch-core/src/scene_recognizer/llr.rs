//! Running aggregate of every stroke's best single-stroke result.

use super::SceneRecognizer;
use crate::data::{DataType, TypedData};
use crate::delta::{SceneDelta, SceneDeltaSet};
use crate::element::ElementId;
use crate::error::SketchResult;
use crate::scene::Scene;

/// Collects each completed stroke's best single-stroke interpretation under
/// a single `"llr_rec"` composite.
///
/// After the child has handled a completed stroke, the stroke's
/// highest-confidence composite parent covering only that stroke is added
/// to the aggregate. The aggregate is never edited in place: the old one is
/// removed and a new one is built from its children plus the new result, so
/// at most one exists at any time. Its confidence is the mean of its
/// children's confidences.
///
/// Removing any child removes the aggregate with it. Whenever the aggregate
/// is missing it is rebuilt from the best result of every live stroke, both
/// after a session closes and on the next completed stroke. Place this
/// recognizer outside recognizers that supersede single-stroke results (such
/// as [`PolygonRecognizer`](super::PolygonRecognizer)) so the rebuild
/// happens in the same session.
///
/// Everything is derived from the scene on each call; nothing is cached.
#[derive(Debug, Clone)]
pub struct LlrRecognizer<C> {
    child: C,
}

impl<C: SceneRecognizer> LlrRecognizer<C> {
    /// Wrap `child`.
    #[must_use]
    pub const fn new(child: C) -> Self {
        Self { child }
    }

    /// The wrapped recognizer.
    #[must_use]
    pub const fn child(&self) -> &C {
        &self.child
    }

    fn best_result(stroke: ElementId, scene: &Scene) -> Option<ElementId> {
        scene
            .parents(stroke)
            .iter()
            .copied()
            .filter(|&p| scene.get(p).is_some_and(|e| e.support().len() == 1))
            .filter_map(|p| scene.composite(p).map(|c| (p, c)))
            .filter(|(_, c)| !c.data.is_type(&DataType::LlrSet))
            .max_by(|a, b| a.1.confidence.total_cmp(&b.1.confidence))
            .map(|(p, _)| p)
    }

    /// Best result of every live stroke, in stroke order.
    fn live_results(scene: &Scene) -> Vec<ElementId> {
        scene
            .strokes()
            .iter()
            .filter_map(|&s| Self::best_result(s, scene))
            .collect()
    }

    fn aggregate(scene: &Scene) -> Option<ElementId> {
        scene.elements_of_type(&DataType::LlrSet, None).first().copied()
    }

    fn accumulate(stroke: ElementId, scene: &mut Scene) -> SketchResult<Option<SceneDelta>> {
        let Some(best) = Self::best_result(stroke, scene) else {
            return Ok(None);
        };
        let previous = Self::aggregate(scene);
        let children = match previous {
            Some(p) => {
                let mut children = scene.children(p);
                if children.contains(&best) {
                    return Ok(None);
                }
                children.push(best);
                children
            }
            None => Self::live_results(scene),
        };
        Self::rebuild(previous, children, scene).map(Some)
    }

    /// Recreate a missing aggregate from the surviving stroke results.
    fn restore(scene: &mut Scene) -> SketchResult<Option<SceneDelta>> {
        if Self::aggregate(scene).is_some() {
            return Ok(None);
        }
        let children = Self::live_results(scene);
        if children.is_empty() {
            return Ok(None);
        }
        tracing::debug!(results = children.len(), "llr aggregate restored");
        Self::rebuild(None, children, scene).map(Some)
    }

    fn rebuild(
        previous: Option<ElementId>,
        children: Vec<ElementId>,
        scene: &mut Scene,
    ) -> SketchResult<SceneDelta> {
        let removed = match previous {
            Some(p) => scene.remove_element(p)?,
            None => Vec::new(),
        };
        let confidences: Vec<f64> = children
            .iter()
            .filter_map(|&c| scene.get(c).and_then(|e| e.confidence()))
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let confidence = confidences.iter().sum::<f64>() / confidences.len().max(1) as f64;
        let named = children
            .into_iter()
            .enumerate()
            .map(|(i, c)| (format!("result{i}"), c))
            .collect();
        let added = scene.add_composite(TypedData::LlrSet, confidence, named)?;
        tracing::debug!(%added, replaced = ?previous, confidence, "llr aggregate rebuilt");
        Ok(SceneDelta::replacing(removed, added))
    }
}

impl<C: SceneRecognizer> SceneRecognizer for LlrRecognizer<C> {
    fn stroke_started(
        &mut self,
        stroke: ElementId,
        scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        self.child.stroke_started(stroke, scene)
    }

    fn stroke_modified(
        &mut self,
        stroke: ElementId,
        scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        self.child.stroke_modified(stroke, scene)
    }

    fn stroke_completed(
        &mut self,
        stroke: ElementId,
        scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        let mut deltas = self.child.stroke_completed(stroke, scene)?;
        if let Some(delta) = Self::accumulate(stroke, scene)? {
            deltas.push(delta);
        }
        Ok(deltas)
    }

    fn session_completed(
        &mut self,
        strokes: &[ElementId],
        scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        let mut deltas = self.child.session_completed(strokes, scene)?;
        if let Some(delta) = Self::restore(scene)? {
            deltas.push(delta);
        }
        Ok(deltas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::LineRecognizer;
    use crate::scene_recognizer::{PolygonRecognizer, StrokeSceneRecognizer};
    use crate::stroke::Stroke;

    fn line(scene: &mut Scene, i: u32) -> ElementId {
        let y = f64::from(i) * 20.0;
        scene.add_stroke(Stroke::from_triples(&[(0.0, y, 0), (50.0, y + 3.0, 5), (100.0, y, 10)]))
    }

    #[test]
    fn test_first_result_is_additive_then_replacing() {
        let mut scene = Scene::new();
        let mut rec = LlrRecognizer::new(StrokeSceneRecognizer::new(LineRecognizer::new()));

        let a = line(&mut scene, 0);
        let first = rec.stroke_completed(a, &mut scene).unwrap();
        assert_eq!(first.len(), 2);
        let aggregate = first.iter().nth(1).unwrap();
        assert!(aggregate.is_additive());

        let b = line(&mut scene, 1);
        let second = rec.stroke_completed(b, &mut scene).unwrap();
        let replaced = second.iter().nth(1).unwrap();
        assert_eq!(replaced.removed, vec![aggregate.added]);
        assert_eq!(scene.children(replaced.added).len(), 2);
    }

    #[test]
    fn test_confidence_is_mean_of_children() {
        let mut scene = Scene::new();
        let mut rec = LlrRecognizer::new(StrokeSceneRecognizer::new(LineRecognizer::new()));
        for i in 0..2 {
            let s = line(&mut scene, i);
            rec.stroke_completed(s, &mut scene).unwrap();
        }
        let llr = scene.elements_of_type(&DataType::LlrSet, None);
        let composite = scene.composite(llr[0]).unwrap();
        // Each stroke bows by three units: 0.97.
        assert!((composite.confidence - 0.97).abs() < 1e-9);
        assert_eq!(composite.child("result1"), Some(composite.children[1].element));
    }

    #[test]
    fn test_stroke_without_result_leaves_aggregate_alone() {
        let mut scene = Scene::new();
        let mut rec = LlrRecognizer::new(StrokeSceneRecognizer::new(LineRecognizer::new()));
        let bowed = Stroke::from_triples(&[(0.0, 0.0, 0), (50.0, 150.0, 5), (100.0, 0.0, 10)]);
        let s = scene.add_stroke(bowed);
        assert!(rec.stroke_completed(s, &mut scene).unwrap().is_no_delta());
        assert!(scene.elements_of_type(&DataType::LlrSet, None).is_empty());
    }

    #[test]
    fn test_superseded_results_leave_other_strokes_aggregated() {
        let mut scene = Scene::new();
        let lines = StrokeSceneRecognizer::new(LineRecognizer::new());
        let mut rec = LlrRecognizer::new(PolygonRecognizer::new(lines));
        let mut segment = |scene: &mut Scene, from: (f64, f64), to: (f64, f64)| {
            let stroke = Stroke::from_triples(&[(from.0, from.1, 0), (to.0, to.1, 10)]);
            let s = scene.add_stroke(stroke);
            rec.stroke_completed(s, scene).unwrap();
            s
        };

        let lone = segment(&mut scene, (0.0, 300.0), (100.0, 300.0));
        let triangle = vec![
            segment(&mut scene, (0.0, 0.0), (100.0, 0.0)),
            segment(&mut scene, (100.0, 0.0), (50.0, 80.0)),
            segment(&mut scene, (50.0, 80.0), (0.0, 0.0)),
        ];
        let later = segment(&mut scene, (0.0, 400.0), (100.0, 400.0));

        let deltas = rec.session_completed(&triangle, &mut scene).unwrap();
        assert_eq!(deltas.len(), 2);
        let polygon = deltas.iter().next().unwrap().added;
        let restored = deltas.iter().nth(1).unwrap();
        assert!(restored.is_additive());

        let llr = scene.elements_of_type(&DataType::LlrSet, None);
        assert_eq!(llr, vec![restored.added]);
        let covered: Vec<ElementId> = scene
            .children(llr[0])
            .into_iter()
            .flat_map(|r| scene.children(r))
            .collect();
        assert_eq!(covered, vec![lone, later]);
        assert_eq!(scene.roots().len(), 2);
        assert!(scene.contains(polygon));
    }
}
