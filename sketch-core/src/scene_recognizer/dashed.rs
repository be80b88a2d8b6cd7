//! Paths drawn as a series of short dashes.

use serde::{Deserialize, Serialize};

use super::{scene_stroke, SceneRecognizer};
use crate::data::TypedData;
use crate::delta::{SceneDelta, SceneDeltaSet};
use crate::element::ElementId;
use crate::error::SketchResult;
use crate::filter::{ApproximateFilter, ApproximationConfig};
use crate::geometry::{distance, distance_sq, mean_and_deviation};
use crate::scene::Scene;
use crate::stroke::{Stroke, TimedPoint};

/// Acceptance thresholds for [`DashedPathRecognizer`], in canvas units.
///
/// The defaults were tuned for pixel input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashedPathConfig {
    /// Mean gap must exceed this.
    pub min_gap_mean: f64,
    /// Gap standard deviation must stay below this.
    pub max_gap_dev: f64,
    /// Dash length standard deviation must stay below this.
    pub max_len_dev: f64,
    /// Fewest strokes that can form a dashed path.
    pub min_strokes: usize,
    /// Simplification of the path through the dash endpoints.
    pub approximation: ApproximationConfig,
}

impl Default for DashedPathConfig {
    fn default() -> Self {
        Self {
            min_gap_mean: 5.0,
            max_gap_dev: 12.0,
            max_len_dev: 20.0,
            min_strokes: 3,
            approximation: ApproximationConfig::default(),
        }
    }
}

/// Recognizes a session of evenly sized, evenly spaced strokes as one
/// dashed path.
///
/// The new composite has the strokes as children (`"dash0"`, `"dash1"`,
/// ...) and is added alongside existing interpretations. Confidence starts
/// at 1 and loses up to one half for each deviation as it approaches its
/// threshold.
#[derive(Debug, Clone)]
pub struct DashedPathRecognizer<C> {
    child: C,
    config: DashedPathConfig,
}

impl<C: SceneRecognizer> DashedPathRecognizer<C> {
    /// Wrap `child` with default configuration.
    #[must_use]
    pub fn new(child: C) -> Self {
        Self::with_config(child, DashedPathConfig::default())
    }

    /// Wrap `child`.
    #[must_use]
    pub const fn with_config(child: C, config: DashedPathConfig) -> Self {
        Self { child, config }
    }

    /// The wrapped recognizer.
    #[must_use]
    pub const fn child(&self) -> &C {
        &self.child
    }

    /// Score a sequence of dash endpoints, or `None` if they are not a
    /// dashed path.
    fn score(&self, ends: &[[TimedPoint; 2]]) -> Option<(TypedData, f64)> {
        let lengths: Vec<f64> = ends
            .iter()
            .map(|[a, b]| distance(a.point(), b.point()))
            .collect();
        let gaps: Vec<f64> = ends
            .windows(2)
            .map(|w| nearest(&w[0], &w[1]).sqrt())
            .collect();
        let (len_mean, len_dev) = mean_and_deviation(&lengths);
        let (gap_mean, gap_dev) = mean_and_deviation(&gaps);

        let c = &self.config;
        let accepted =
            gap_mean > c.min_gap_mean && gap_dev < c.max_gap_dev && len_dev < c.max_len_dev;
        if !accepted {
            tracing::debug!(gap_mean, gap_dev, len_dev, "dashed path rejected");
            return None;
        }
        let path: Stroke = orient(ends).into_iter().flatten().collect();
        let path = ApproximateFilter::with_config(c.approximation).approximate(&path);
        let penalty = 0.5 * gap_dev / c.max_gap_dev + 0.5 * len_dev / c.max_len_dev;
        let confidence = (1.0 - penalty).clamp(0.0, 1.0);
        tracing::debug!(gap_mean, gap_dev, len_mean, len_dev, confidence, "dashed path accepted");
        let data = TypedData::DashedPath {
            path: path.positions(),
            avg_segment_len: len_mean,
            avg_gap_len: gap_mean,
        };
        Some((data, confidence))
    }
}

/// Smallest squared distance between any endpoint of `a` and any of `b`.
fn nearest(a: &[TimedPoint; 2], b: &[TimedPoint; 2]) -> f64 {
    a.iter()
        .flat_map(|p| b.iter().map(move |q| distance_sq(p.point(), q.point())))
        .fold(f64::INFINITY, f64::min)
}

/// Flip dashes so each one starts at the end nearest its predecessor.
fn orient(ends: &[[TimedPoint; 2]]) -> Vec<[TimedPoint; 2]> {
    let mut out: Vec<[TimedPoint; 2]> = Vec::with_capacity(ends.len());
    for &[a, b] in ends {
        let flip = match out.last() {
            Some(&[_, prev]) => {
                distance_sq(b.point(), prev.point()) < distance_sq(a.point(), prev.point())
            }
            None => ends.get(1).is_some_and(|next| {
                nearest(&[a, a], next) < nearest(&[b, b], next)
            }),
        };
        out.push(if flip { [b, a] } else { [a, b] });
    }
    out
}

impl<C: SceneRecognizer> SceneRecognizer for DashedPathRecognizer<C> {
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
        self.child.stroke_completed(stroke, scene)
    }

    fn session_completed(
        &mut self,
        strokes: &[ElementId],
        scene: &mut Scene,
    ) -> SketchResult<SceneDeltaSet> {
        let mut deltas = self.child.session_completed(strokes, scene)?;
        if strokes.len() < self.config.min_strokes.max(3) {
            return Ok(deltas);
        }
        let mut ends = Vec::with_capacity(strokes.len());
        for &id in strokes {
            let stroke = scene_stroke(scene, id)?;
            match (stroke.first(), stroke.last()) {
                (Some(&a), Some(&b)) => ends.push([a, b]),
                _ => return Ok(deltas),
            }
        }
        let Some((data, confidence)) = self.score(&ends) else {
            return Ok(deltas);
        };
        let children = strokes
            .iter()
            .enumerate()
            .map(|(i, &s)| (format!("dash{i}"), s))
            .collect();
        let added = scene.add_composite(data, confidence, children)?;
        deltas.push(SceneDelta::additive(added));
        Ok(deltas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    /// A null child so only dashed-path changes show up.
    struct Nothing;
    impl SceneRecognizer for Nothing {}

    fn dashes(scene: &mut Scene, segments: &[(f64, f64, f64, f64)]) -> Vec<ElementId> {
        segments
            .iter()
            .map(|&(x0, y0, x1, y1)| {
                scene.add_stroke(Stroke::from_triples(&[(x0, y0, 0), (x1, y1, 50)]))
            })
            .collect()
    }

    #[test]
    fn test_even_dashes_form_a_path() {
        let mut scene = Scene::new();
        let segs: Vec<(f64, f64, f64, f64)> = (0..5)
            .map(|i| {
                let x = f64::from(i) * 30.0;
                // Every other dash drawn backwards.
                if i % 2 == 0 { (x, 0.0, x + 20.0, 0.0) } else { (x + 20.0, 0.0, x, 0.0) }
            })
            .collect();
        let strokes = dashes(&mut scene, &segs);
        let mut rec = DashedPathRecognizer::new(Nothing);

        let deltas = rec.session_completed(&strokes, &mut scene).unwrap();
        assert_eq!(deltas.len(), 1);
        let composite = scene.composite(deltas.added()[0]).unwrap();
        let TypedData::DashedPath { path, avg_segment_len, avg_gap_len } = &composite.data else {
            panic!("expected dashed path, got {:?}", composite.data);
        };
        assert_eq!(path, &vec![Point::new(0.0, 0.0), Point::new(140.0, 0.0)]);
        assert!((avg_segment_len - 20.0).abs() < 1e-9);
        assert!((avg_gap_len - 10.0).abs() < 1e-9);
        assert!((composite.confidence - 1.0).abs() < 1e-9);
        assert_eq!(composite.child("dash4"), Some(strokes[4]));
    }

    #[test]
    fn test_touching_strokes_are_not_dashes() {
        let mut scene = Scene::new();
        let strokes = dashes(
            &mut scene,
            &[(0.0, 0.0, 20.0, 0.0), (20.0, 0.0, 40.0, 0.0), (40.0, 0.0, 60.0, 0.0)],
        );
        let mut rec = DashedPathRecognizer::new(Nothing);
        assert!(rec.session_completed(&strokes, &mut scene).unwrap().is_no_delta());
    }

    #[test]
    fn test_uneven_gaps_are_rejected() {
        let mut scene = Scene::new();
        // Gaps of 10 and 60: deviation 25.
        let strokes = dashes(
            &mut scene,
            &[(0.0, 0.0, 20.0, 0.0), (30.0, 0.0, 50.0, 0.0), (110.0, 0.0, 130.0, 0.0)],
        );
        let mut rec = DashedPathRecognizer::new(Nothing);
        assert!(rec.session_completed(&strokes, &mut scene).unwrap().is_no_delta());
    }

    #[test]
    fn test_uneven_lengths_lower_confidence() {
        let mut scene = Scene::new();
        // Lengths 10, 30, 10, 30: deviation 10, half the threshold.
        let strokes = dashes(
            &mut scene,
            &[
                (0.0, 0.0, 10.0, 0.0),
                (20.0, 0.0, 50.0, 0.0),
                (60.0, 0.0, 70.0, 0.0),
                (80.0, 0.0, 110.0, 0.0),
            ],
        );
        let mut rec = DashedPathRecognizer::new(Nothing);
        let deltas = rec.session_completed(&strokes, &mut scene).unwrap();
        let composite = scene.composite(deltas.added()[0]).unwrap();
        assert!((composite.confidence - 0.75).abs() < 1e-9);
    }
}
