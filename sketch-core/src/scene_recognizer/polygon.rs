//! Closed polygons assembled from line strokes.

use serde::{Deserialize, Serialize};

use super::SceneRecognizer;
use crate::data::TypedData;
use crate::delta::{SceneDelta, SceneDeltaSet};
use crate::element::ElementId;
use crate::error::{SketchError, SketchResult};
use crate::geometry::{distance_sq, Point};
use crate::scene::Scene;

/// Configuration for [`PolygonRecognizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonConfig {
    /// Minimum confidence of each stroke's "line" interpretation.
    pub min_line_confidence: f64,
    /// Squared distance within which two endpoints meet.
    pub endpoint_dist_sq: f64,
    /// Fewest strokes that can form a polygon.
    pub min_strokes: usize,
}

impl Default for PolygonConfig {
    fn default() -> Self {
        Self {
            min_line_confidence: 0.7,
            endpoint_dist_sq: 100.0,
            min_strokes: 3,
        }
    }
}

/// A stroke with its accepted line interpretation.
#[derive(Debug, Clone, Copy)]
struct Edge {
    stroke: ElementId,
    line: ElementId,
    ends: [Point; 2],
    confidence: f64,
}

/// Recognizes a session of line strokes whose endpoints close into a
/// single cycle.
///
/// The per-stroke line composites are superseded by one polygon composite
/// whose children are the strokes themselves, in cycle order. Its
/// confidence is the weakest line confidence. Only endpoint matching is
/// checked, not convexity.
#[derive(Debug, Clone)]
pub struct PolygonRecognizer<C> {
    child: C,
    config: PolygonConfig,
}

impl<C: SceneRecognizer> PolygonRecognizer<C> {
    /// Wrap `child` with default configuration.
    #[must_use]
    pub fn new(child: C) -> Self {
        Self::with_config(child, PolygonConfig::default())
    }

    /// Wrap `child`.
    #[must_use]
    pub const fn with_config(child: C, config: PolygonConfig) -> Self {
        Self { child, config }
    }

    /// The wrapped recognizer.
    #[must_use]
    pub const fn child(&self) -> &C {
        &self.child
    }

    /// Best qualifying line interpretation of each stroke, or `None` if
    /// any stroke lacks one.
    fn edges(&self, strokes: &[ElementId], scene: &Scene) -> SketchResult<Option<Vec<Edge>>> {
        let mut edges = Vec::with_capacity(strokes.len());
        for &stroke in strokes {
            if scene.stroke(stroke).is_none() {
                return Err(SketchError::ElementNotFound(stroke));
            }
            let best = scene
                .parents(stroke)
                .iter()
                .filter_map(|&p| scene.composite(p).map(|c| (p, c)))
                .filter_map(|(p, c)| match c.data {
                    TypedData::Line { start, end }
                        if c.confidence >= self.config.min_line_confidence =>
                    {
                        Some(Edge {
                            stroke,
                            line: p,
                            ends: [start, end],
                            confidence: c.confidence,
                        })
                    }
                    _ => None,
                })
                .max_by(|a, b| a.confidence.total_cmp(&b.confidence));
            match best {
                Some(edge) => edges.push(edge),
                None => return Ok(None),
            }
        }
        Ok(Some(edges))
    }

    /// Chain edges into one cycle. Returns the edge order and the vertex
    /// (midpoint of each joint) following each edge.
    fn close_cycle(&self, edges: &[Edge]) -> Option<(Vec<usize>, Vec<Point>)> {
        let n = edges.len();
        // partner[2 * i + k] is the endpoint joined to end k of edge i.
        let mut partner = vec![0usize; 2 * n];
        for a in 0..2 * n {
            let pa = edges[a / 2].ends[a % 2];
            let mut matches = (0..2 * n).filter(|&b| {
                b / 2 != a / 2
                    && distance_sq(pa, edges[b / 2].ends[b % 2]) <= self.config.endpoint_dist_sq
            });
            match (matches.next(), matches.next()) {
                (Some(b), None) => partner[a] = b,
                _ => return None,
            }
        }

        let mut order = Vec::with_capacity(n);
        let mut vertices = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        // Leave edge 0 through its end, come back through its start.
        let mut exit = 1;
        loop {
            let edge = exit / 2;
            if visited[edge] {
                break;
            }
            visited[edge] = true;
            order.push(edge);
            let entry = partner[exit];
            vertices.push(edges[edge].ends[exit % 2].midpoint(edges[entry / 2].ends[entry % 2]));
            exit = entry ^ 1;
        }
        (order.len() == n && exit == 1).then_some((order, vertices))
    }
}

impl<C: SceneRecognizer> SceneRecognizer for PolygonRecognizer<C> {
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
        let Some(edges) = self.edges(strokes, scene)? else {
            tracing::debug!(strokes = strokes.len(), "polygon rejected: not all strokes are lines");
            return Ok(deltas);
        };
        let Some((order, vertices)) = self.close_cycle(&edges) else {
            tracing::debug!(strokes = strokes.len(), "polygon rejected: endpoints do not close");
            return Ok(deltas);
        };

        let mut removed = Vec::new();
        for edge in &edges {
            if scene.contains(edge.line) {
                removed.extend(scene.remove_element(edge.line)?);
            }
        }
        let confidence = edges
            .iter()
            .map(|e| e.confidence)
            .fold(f64::INFINITY, f64::min);
        let children = order
            .iter()
            .enumerate()
            .map(|(i, &e)| (format!("edge{i}"), edges[e].stroke))
            .collect();
        let polygon = scene.add_composite(TypedData::Polygon { vertices }, confidence, children)?;
        tracing::debug!(%polygon, sides = edges.len(), confidence, "polygon recognized");
        deltas.push(SceneDelta::replacing(removed, polygon));
        Ok(deltas)
    }
}
