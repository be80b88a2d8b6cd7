//! # Saorsa Sketch Core
//!
//! Recognition core for hand-drawn pen input: geometric stroke filters,
//! single-stroke recognizers and their combinators, and scene recognizers
//! that compose multi-stroke sessions into a confidence-weighted
//! interpretation forest.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 sketch-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Filters         │  Stroke Recognizers      │
//! │  - Dedup/average │  - Line, scribble        │
//! │  - Dehook        │  - Cache, voting         │
//! │  - Resample      │  - Moded (pan, zoom)     │
//! │  - Approximate   │                          │
//! ├─────────────────────────────────────────────┤
//! │  Scene Recognizers  │  Scene Arena          │
//! │  - Stroke adapter   │  - Strokes            │
//! │  - Polygon, dashed  │  - Composites         │
//! │  - LLR aggregate    │  - Choices            │
//! ├─────────────────────────────────────────────┤
//! │  Interpreter: pen events ─► sessions        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Confidences are on a `[0, 1]` scale throughout.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod data;
pub mod delta;
pub mod element;
pub mod error;
pub mod event;
pub mod filter;
pub mod geometry;
pub mod interpreter;
pub mod recognition;
pub mod recognizer;
pub mod scene;
pub mod scene_recognizer;
pub mod stroke;

pub use config::{SketchConfig, StandardSceneRecognizer, StandardStrokeRecognizer};
pub use data::{DataType, TypedData};
pub use delta::{SceneDelta, SceneDeltaSet};
pub use element::{
    Alternative, ChoiceElement, CompositeElement, Element, ElementId, ElementKind, NamedChild,
    StrokeElement,
};
pub use error::{SketchError, SketchResult};
pub use event::{PenEvent, PenPhase};
pub use filter::{FilterPipeline, StrokeFilter};
pub use geometry::Point;
pub use interpreter::{SessionConfig, SketchInterpreter};
pub use recognition::{Recognition, RecognitionSet};
pub use recognizer::{ModedState, StrokeRecognizer};
pub use scene::Scene;
pub use scene_recognizer::{SceneRecognizer, StrokeSceneConfig, StrokeSceneRecognizer};
pub use stroke::{Bounds, Stroke, StrokeId, TimedPoint};

/// Sketch core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
