//! # Saorsa Sketch Replay
//!
//! Command-line driver that replays synthetic pen input through the
//! standard recognizer stack and reports how the scene was interpreted.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p sketch-replay -- square
//! cargo run -p sketch-replay -- dashes --json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ReplayConfig` - Which shape to draw and how to configure the recognizers
//! - [`pen_events`] - Synthetic pen input for each [`Shape`]
//! - [`replay`] - Runs the events through a [`SketchInterpreter`]
//! - [`summarize`] / [`render`] - Turns the resulting scene into output

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use sketch_core::event::trace_stroke;
use sketch_core::{
    DataType, ElementId, PenEvent, Scene, SketchConfig, SketchInterpreter,
    StandardSceneRecognizer,
};

/// Samples per straight stroke.
const SEGMENT_SAMPLES: u32 = 4;

/// Milliseconds between samples within a stroke.
const SAMPLE_STEP_MS: u64 = 10;

/// Command-line arguments for sketch-replay.
#[derive(Debug, Clone, Parser)]
#[command(name = "sketch-replay")]
#[command(about = "Replay synthetic pen input through Saorsa Sketch recognizers")]
#[command(version)]
pub struct CliArgs {
    /// Shape to draw.
    #[arg(value_enum, default_value = "square")]
    pub shape: Shape,

    /// JSON recognizer configuration file.
    #[arg(long, env = "SKETCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pause (ms) that separates sessions, overriding the configuration.
    #[arg(long, env = "SKETCH_PAUSE_MS")]
    pub pause_ms: Option<u64>,

    /// Print the whole scene as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

/// Synthetic drawings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shape {
    /// Four straight sides of a square.
    Square,
    /// Three straight sides of a triangle.
    Triangle,
    /// Five evenly spaced dashes along a horizontal path.
    Dashes,
    /// One tall zig-zag stroke.
    Scribble,
}

/// Replay configuration.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Shape to draw.
    pub shape: Shape,
    /// Recognizer configuration file, if any.
    pub config_path: Option<PathBuf>,
    /// Session pause override.
    pub pause_ms: Option<u64>,
    /// Emit JSON.
    pub json: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self::new(Shape::Square)
    }
}

impl ReplayConfig {
    /// Create a configuration that draws `shape` with default recognizers.
    #[must_use]
    pub const fn new(shape: Shape) -> Self {
        Self {
            shape,
            config_path: None,
            pause_ms: None,
            json: false,
        }
    }

    /// Build the recognizer configuration from `document` (JSON, if any)
    /// with the pause override applied.
    ///
    /// # Errors
    ///
    /// Returns an error if `document` is not a valid configuration.
    pub fn sketch_config(&self, document: Option<&str>) -> anyhow::Result<SketchConfig> {
        let mut config = match document {
            Some(json) => SketchConfig::from_json(json).context("invalid recognizer config")?,
            None => SketchConfig::default(),
        };
        if let Some(pause_ms) = self.pause_ms {
            config.session.pause_ms = pause_ms;
        }
        Ok(config)
    }
}

impl From<CliArgs> for ReplayConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            shape: args.shape,
            config_path: args.config,
            pause_ms: args.pause_ms,
            json: args.json,
        }
    }
}

/// Pen events for a straight stroke.
fn segment(from: (f64, f64), to: (f64, f64), start_ms: u64) -> Vec<PenEvent> {
    let vertices: Vec<(f64, f64)> = (0..=SEGMENT_SAMPLES)
        .map(|k| {
            let r = f64::from(k) / f64::from(SEGMENT_SAMPLES);
            (from.0 + r * (to.0 - from.0), from.1 + r * (to.1 - from.1))
        })
        .collect();
    trace_stroke(&vertices, start_ms, SAMPLE_STEP_MS)
}

/// One stroke per side of the closed outline through `corners`.
fn outline(corners: &[(f64, f64)], gap_ms: u64) -> Vec<PenEvent> {
    let mut events = Vec::new();
    let mut start_ms = 0;
    for (i, &from) in corners.iter().enumerate() {
        let to = corners[(i + 1) % corners.len()];
        events.extend(segment(from, to, start_ms));
        start_ms += gap_ms;
    }
    events
}

/// Synthetic pen input for `shape`.
///
/// Strokes follow each other closely enough to stay in one session.
#[must_use]
pub fn pen_events(shape: Shape) -> Vec<PenEvent> {
    match shape {
        Shape::Square => outline(
            &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
            100,
        ),
        Shape::Triangle => outline(&[(0.0, 0.0), (120.0, 0.0), (60.0, 100.0)], 100),
        Shape::Dashes => (0..5u32)
            .flat_map(|i| {
                let x = f64::from(i) * 35.0;
                segment((x, 50.0), (x + 20.0, 50.0), u64::from(i) * 200)
            })
            .collect(),
        Shape::Scribble => {
            let vertices: Vec<(f64, f64)> = (0..=6)
                .map(|i| (f64::from(i) * 10.0, if i % 2 == 0 { 40.0 } else { 0.0 }))
                .collect();
            trace_stroke(&vertices, 0, SAMPLE_STEP_MS)
        }
    }
}

/// Draw `shape` through the standard stack and close the session.
///
/// # Errors
///
/// Returns an error if the interpreter rejects an event or a recognizer
/// fails.
pub fn replay(
    shape: Shape,
    config: &SketchConfig,
) -> anyhow::Result<SketchInterpreter<StandardSceneRecognizer>> {
    let mut interp = config.interpreter();
    let events = pen_events(shape);
    tracing::debug!(?shape, events = events.len(), "replaying pen input");

    for event in &events {
        interp.process(event).with_context(|| {
            format!("processing {:?} at {}ms", event.phase, event.timestamp_ms)
        })?;
    }
    let deltas = interp.flush_session().context("closing session")?;
    tracing::info!(
        ?shape,
        deltas = deltas.len(),
        strokes = interp.scene().stroke_count(),
        composites = interp.scene().composite_count(),
        "replay finished"
    );
    Ok(interp)
}

/// One top-level interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootSummary {
    /// Element handle.
    pub id: ElementId,
    /// Interpretation type.
    pub kind: DataType,
    /// Confidence.
    pub confidence: f64,
    /// Number of strokes the interpretation covers.
    pub strokes: usize,
}

/// Top-level interpretations of `scene`, most confident first.
#[must_use]
pub fn summarize(scene: &Scene) -> Vec<RootSummary> {
    scene
        .roots()
        .into_iter()
        .filter_map(|id| {
            let element = scene.get(id)?;
            Some(RootSummary {
                id,
                kind: element.data()?.data_type(),
                confidence: element.confidence()?,
                strokes: element.support().len(),
            })
        })
        .collect()
}

/// Render `scene` for the terminal, or as JSON when `json` is set.
///
/// # Errors
///
/// Returns an error if the scene cannot be serialized.
pub fn render(scene: &Scene, json: bool) -> anyhow::Result<String> {
    if json {
        return scene.to_json().context("serializing scene");
    }

    let mut out = format!(
        "{} strokes, {} interpretations\n",
        scene.stroke_count(),
        scene.composite_count()
    );
    for root in summarize(scene) {
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{:>6}  {:<12} {:.3}  ({} strokes)",
            root.id.to_string(),
            root.kind.as_str(),
            root.confidence,
            root.strokes
        );
    }
    Ok(out)
}
