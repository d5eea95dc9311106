//! meshview core library - polygon mesh loading and incremental affine transforms
//!
//! This library owns the in-memory model: OBJ parsing, mesh storage, the
//! transform accumulator and the engine that applies delta events to the mesh.

// Library code reports errors instead of panicking; tests may unwrap.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod engine;
pub mod error;
pub mod geometry;
pub mod obj;
pub mod transform;

// Re-export commonly used types
pub use engine::{EngineState, Event, Notification, TransformEngine};
pub use error::{ParseError, ParseErrorKind, ParseResult, TransformError, TransformResult};
pub use geometry::{Axis, Bounds, Face, MeshData};
pub use transform::{Transform, TransformAccumulator, TransformParameters};
