//! Drives a scene recognizer from raw pen events.
//!
//! The interpreter records each pen-down..pen-up run as a stroke element,
//! forwards lifecycle callbacks to the recognizer, and groups strokes into
//! sessions. A session ends when the pen goes down again after a pause
//! longer than [`SessionConfig::pause_ms`], or on [`SketchInterpreter::flush_session`].

use serde::{Deserialize, Serialize};

use crate::delta::SceneDeltaSet;
use crate::element::ElementId;
use crate::error::{SketchError, SketchResult};
use crate::event::{PenEvent, PenPhase};
use crate::scene::Scene;
use crate::scene_recognizer::SceneRecognizer;
use crate::stroke::Stroke;

/// Session grouping configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pen-up to pen-down pause (ms) that separates sessions.
    pub pause_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { pause_ms: 1000 }
    }
}

/// Owns a scene and feeds it pen input through a recognizer.
#[derive(Debug)]
pub struct SketchInterpreter<R> {
    scene: Scene,
    recognizer: R,
    config: SessionConfig,
    /// Stroke currently being drawn.
    active: Option<ElementId>,
    /// Completed strokes of the open session.
    session: Vec<ElementId>,
    last_up_ms: Option<u64>,
}

impl<R: SceneRecognizer> SketchInterpreter<R> {
    /// Create with an empty scene and default session config.
    #[must_use]
    pub fn new(recognizer: R) -> Self {
        Self::with_config(recognizer, SessionConfig::default())
    }

    /// Create with custom session configuration.
    #[must_use]
    pub fn with_config(recognizer: R, config: SessionConfig) -> Self {
        Self {
            scene: Scene::new(),
            recognizer,
            config,
            active: None,
            session: Vec::new(),
            last_up_ms: None,
        }
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Update the configuration.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    /// The interpreted scene.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access for edits outside recognition (e.g. deleting strokes).
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The recognizer.
    #[must_use]
    pub const fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Strokes completed in the open session.
    #[must_use]
    pub fn session(&self) -> &[ElementId] {
        &self.session
    }

    /// Stroke currently being drawn.
    #[must_use]
    pub const fn active_stroke(&self) -> Option<ElementId> {
        self.active
    }

    /// Process one pen event and return every change it caused.
    ///
    /// Moves and pen-ups without a preceding pen-down are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error on a pen-down while a stroke is active, or if the
    /// recognizer fails.
    pub fn process(&mut self, event: &PenEvent) -> SketchResult<SceneDeltaSet> {
        match event.phase {
            PenPhase::Down => self.pen_down(event),
            PenPhase::Move => self.pen_move(event),
            PenPhase::Up => self.pen_up(event),
        }
    }

    fn pen_down(&mut self, event: &PenEvent) -> SketchResult<SceneDeltaSet> {
        if let Some(active) = self.active {
            return Err(SketchError::InvalidOperation(format!(
                "pen down while {active} is still being drawn"
            )));
        }
        let mut deltas = SceneDeltaSet::NO_DELTA;
        let paused = self
            .last_up_ms
            .is_some_and(|up| event.timestamp_ms.saturating_sub(up) > self.config.pause_ms);
        if paused {
            deltas.merge(self.flush_session()?);
        }

        let stroke = self
            .scene
            .add_stroke(Stroke::from_points(vec![event.sample()]));
        self.active = Some(stroke);
        deltas.merge(self.recognizer.stroke_started(stroke, &mut self.scene)?);
        Ok(deltas)
    }

    fn pen_move(&mut self, event: &PenEvent) -> SketchResult<SceneDeltaSet> {
        let Some(stroke) = self.active else {
            return Ok(SceneDeltaSet::NO_DELTA);
        };
        self.scene.extend_stroke(stroke, event.sample())?;
        self.recognizer.stroke_modified(stroke, &mut self.scene)
    }

    fn pen_up(&mut self, event: &PenEvent) -> SketchResult<SceneDeltaSet> {
        let Some(stroke) = self.active.take() else {
            return Ok(SceneDeltaSet::NO_DELTA);
        };
        let sample = event.sample();
        let moved = self
            .scene
            .stroke(stroke)
            .and_then(Stroke::last)
            .is_none_or(|last| !last.same_position(&sample));
        if moved {
            self.scene.extend_stroke(stroke, sample)?;
        }
        self.session.push(stroke);
        self.last_up_ms = Some(event.timestamp_ms);
        self.recognizer.stroke_completed(stroke, &mut self.scene)
    }

    /// Close the open session now.
    ///
    /// Returns [`SceneDeltaSet::NO_DELTA`] when no strokes are pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the recognizer fails.
    pub fn flush_session(&mut self) -> SketchResult<SceneDeltaSet> {
        if self.session.is_empty() {
            return Ok(SceneDeltaSet::NO_DELTA);
        }
        let strokes = std::mem::take(&mut self.session);
        tracing::debug!(strokes = strokes.len(), "session completed");
        self.recognizer.session_completed(&strokes, &mut self.scene)
    }
}
