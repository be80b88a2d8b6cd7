//! Three-state machine for continuous single-stroke gestures.
//!
//! ```text
//!            stroke_started           signal recognized
//!   ┌──────┐ ─────────────► ┌─────────┐ ──────────────► ┌────────┐
//!   │ Idle │                │ Unknown │                 │ Action │ ◄─┐ stroke_modified
//!   └──────┘ ◄───────────── └─────────┘                 └────────┘ ──┘ (emit deltas)
//!      ▲      stroke_completed / rejected                    │
//!      └─────────────────────────────────────────────────────┘
//!                          stroke_completed
//! ```
//!
//! A gesture never spans more than one stroke: completion always returns
//! the machine to [`ModedState::Idle`].

use serde::{Deserialize, Serialize};

use super::StrokeRecognizer;
use crate::error::{SketchError, SketchResult};
use crate::recognition::RecognitionSet;
use crate::stroke::Stroke;

/// State of a [`ModedRecognizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModedState {
    /// No stroke in progress.
    #[default]
    Idle,
    /// Stroke in progress, gesture not yet identified.
    Unknown,
    /// Gesture identified; every modification emits an action.
    Action,
}

/// The gesture-specific half of a [`ModedRecognizer`].
pub trait ActionRecognizer {
    /// Decide whether the in-progress stroke is the gesture's initiating
    /// signal. Returns the next state and anything to report.
    ///
    /// # Errors
    ///
    /// Returns an error if the wrapped classifier fails.
    fn recognize_action_signal(
        &mut self,
        stroke: &Stroke,
    ) -> SketchResult<(ModedState, RecognitionSet)>;

    /// Produce the continuous action for a stroke already in action mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the action cannot be computed.
    fn process_action_stroke(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet>;

    /// Clear per-stroke state when the stroke completes.
    fn reset(&mut self) {}
}

/// Drives an [`ActionRecognizer`] through the idle/unknown/action cycle.
#[derive(Debug, Clone, Default)]
pub struct ModedRecognizer<A> {
    action: A,
    state: ModedState,
}

impl<A: ActionRecognizer> ModedRecognizer<A> {
    /// Wrap a gesture.
    #[must_use]
    pub const fn new(action: A) -> Self {
        Self {
            action,
            state: ModedState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ModedState {
        self.state
    }

    /// The wrapped gesture.
    #[must_use]
    pub const fn action(&self) -> &A {
        &self.action
    }

    fn transition(&mut self, next: ModedState) {
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "moded recognizer transition");
            self.state = next;
        }
    }
}

impl<A: ActionRecognizer> StrokeRecognizer for ModedRecognizer<A> {
    fn stroke_started(&mut self, _stroke: &Stroke) -> SketchResult<RecognitionSet> {
        if self.state != ModedState::Idle {
            return Err(SketchError::InvalidTransition {
                state: self.state,
                event: "stroke_started",
            });
        }
        self.transition(ModedState::Unknown);
        Ok(RecognitionSet::NO_RECOGNITION)
    }

    fn stroke_modified(&mut self, stroke: &Stroke) -> SketchResult<RecognitionSet> {
        match self.state {
            ModedState::Idle => Ok(RecognitionSet::NO_RECOGNITION),
            ModedState::Unknown => {
                let (next, set) = self.action.recognize_action_signal(stroke)?;
                self.transition(next);
                Ok(set)
            }
            ModedState::Action => self.action.process_action_stroke(stroke),
        }
    }

    fn stroke_completed(&mut self, _stroke: &Stroke) -> SketchResult<RecognitionSet> {
        self.transition(ModedState::Idle);
        self.action.reset();
        Ok(RecognitionSet::NO_RECOGNITION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TypedData;
    use crate::stroke::TimedPoint;

    /// Enters action mode at a fixed vertex count; rejects at another.
    struct Threshold {
        accept_at: usize,
        reject_at: usize,
        processed: usize,
    }

    impl ActionRecognizer for Threshold {
        fn recognize_action_signal(
            &mut self,
            stroke: &Stroke,
        ) -> SketchResult<(ModedState, RecognitionSet)> {
            let n = stroke.vertex_count();
            let next = if n >= self.accept_at {
                ModedState::Action
            } else if n >= self.reject_at {
                ModedState::Idle
            } else {
                ModedState::Unknown
            };
            Ok((next, RecognitionSet::NO_RECOGNITION))
        }

        fn process_action_stroke(&mut self, _stroke: &Stroke) -> SketchResult<RecognitionSet> {
            self.processed += 1;
            Ok(RecognitionSet::single(TypedData::Pan { dx: 1.0, dy: 0.0 }, 1.0))
        }
    }

    fn machine(accept_at: usize, reject_at: usize) -> ModedRecognizer<Threshold> {
        ModedRecognizer::new(Threshold {
            accept_at,
            reject_at,
            processed: 0,
        })
    }

    #[test]
    fn test_unrecognized_stroke_ends_idle() {
        let mut rec = machine(usize::MAX, usize::MAX);
        let mut stroke = Stroke::new();
        rec.stroke_started(&stroke).unwrap();
        assert_eq!(rec.state(), ModedState::Unknown);
        for i in 0..20u32 {
            stroke.push(TimedPoint::new(f64::from(i), 0.0, u64::from(i)));
            assert!(rec.stroke_modified(&stroke).unwrap().is_no_recognition());
            assert_eq!(rec.state(), ModedState::Unknown);
        }
        rec.stroke_completed(&stroke).unwrap();
        assert_eq!(rec.state(), ModedState::Idle);
    }

    #[test]
    fn test_double_start_is_invalid_transition() {
        let mut rec = machine(usize::MAX, usize::MAX);
        let stroke = Stroke::new();
        rec.stroke_started(&stroke).unwrap();
        let err = rec.stroke_started(&stroke).unwrap_err();
        assert!(matches!(
            err,
            SketchError::InvalidTransition {
                state: ModedState::Unknown,
                event: "stroke_started"
            }
        ));
    }

    #[test]
    fn test_action_mode_processes_until_completion() {
        let mut rec = machine(3, usize::MAX);
        let mut stroke = Stroke::new();
        rec.stroke_started(&stroke).unwrap();
        for i in 0..6u32 {
            stroke.push(TimedPoint::new(f64::from(i), 0.0, u64::from(i)));
            rec.stroke_modified(&stroke).unwrap();
        }
        assert_eq!(rec.state(), ModedState::Action);
        // Signal at 3 points, then points 4, 5, 6 are processed.
        assert_eq!(rec.action().processed, 3);

        rec.stroke_completed(&stroke).unwrap();
        assert_eq!(rec.state(), ModedState::Idle);
        // A fresh stroke may start again.
        assert!(rec.stroke_started(&Stroke::new()).is_ok());
    }

    #[test]
    fn test_rejected_signal_ignores_rest_of_stroke() {
        let mut rec = machine(usize::MAX, 2);
        let mut stroke = Stroke::new();
        rec.stroke_started(&stroke).unwrap();
        for i in 0..5u32 {
            stroke.push(TimedPoint::new(f64::from(i), 0.0, u64::from(i)));
            rec.stroke_modified(&stroke).unwrap();
        }
        assert_eq!(rec.state(), ModedState::Idle);
        assert_eq!(rec.action().processed, 0);
        rec.stroke_completed(&stroke).unwrap();
        assert_eq!(rec.state(), ModedState::Idle);
    }

    #[test]
    fn test_modified_while_idle_is_ignored() {
        let mut rec = machine(1, usize::MAX);
        let stroke = Stroke::from_triples(&[(0.0, 0.0, 0)]);
        assert!(rec.stroke_modified(&stroke).unwrap().is_no_recognition());
        assert_eq!(rec.state(), ModedState::Idle);
    }
}
