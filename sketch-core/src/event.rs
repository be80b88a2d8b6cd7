//! Pen input events.

use serde::{Deserialize, Serialize};

use crate::stroke::TimedPoint;

/// Phase of a pen event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenPhase {
    /// Pen touched the canvas.
    Down,
    /// Pen moved while touching.
    Move,
    /// Pen lifted.
    Up,
}

/// A single pen sample with its phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenEvent {
    /// Phase of this event.
    pub phase: PenPhase,
    /// X position in canvas coordinates.
    pub x: f64,
    /// Y position in canvas coordinates.
    pub y: f64,
    /// Timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl PenEvent {
    /// Create a new pen event.
    #[must_use]
    pub const fn new(phase: PenPhase, x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self {
            phase,
            x,
            y,
            timestamp_ms,
        }
    }

    /// Pen-down at a point.
    #[must_use]
    pub const fn down(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self::new(PenPhase::Down, x, y, timestamp_ms)
    }

    /// Pen-move to a point.
    #[must_use]
    pub const fn moved(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self::new(PenPhase::Move, x, y, timestamp_ms)
    }

    /// Pen-up at a point.
    #[must_use]
    pub const fn up(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self::new(PenPhase::Up, x, y, timestamp_ms)
    }

    /// The sample this event carries.
    #[must_use]
    pub const fn sample(&self) -> TimedPoint {
        TimedPoint::new(self.x, self.y, self.timestamp_ms)
    }
}

/// Pen events tracing a polyline as one stroke: down at the first vertex,
/// a move at each following vertex, up at the last, `step_ms` apart.
///
/// Returns no events for an empty polyline.
#[must_use]
pub fn trace_stroke(vertices: &[(f64, f64)], start_ms: u64, step_ms: u64) -> Vec<PenEvent> {
    let mut t = start_ms;
    let mut events = Vec::with_capacity(vertices.len() + 1);
    for (i, &(x, y)) in vertices.iter().enumerate() {
        let phase = if i == 0 { PenPhase::Down } else { PenPhase::Move };
        events.push(PenEvent::new(phase, x, y, t));
        t += step_ms;
    }
    if let Some(&(x, y)) = vertices.last() {
        events.push(PenEvent::up(x, y, t - step_ms));
    }
    events
}
