//! Orchestrator that owns the loaded mesh and turns delta events into mesh
//! updates.
//!
//! Every inbound event is handled synchronously and produces at most one
//! [`Notification`] per registered observer. Observers only ever see borrowed,
//! read-only views of the mesh.

use std::path::{Path, PathBuf};

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::error::{ParseError, ParseResult, TransformResult};
use crate::geometry::{Axis, Face, MeshData};
use crate::obj;
use crate::transform::{TransformAccumulator, TransformParameters};

/// Inbound event from the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Load(PathBuf),
    /// Translation delta in model units
    Move { value: f32, axis: Axis },
    /// Rotation delta in degrees
    Rotate { value: f32, axis: Axis },
    /// Absolute uniform scale factor, must be > 0
    Scale(f32),
}

/// Outbound notification to the presentation layer
#[derive(Debug, Clone, Copy)]
pub enum Notification<'a> {
    /// A new model replaced the previous one
    ModelLoaded {
        vertices: &'a [Point3<f32>],
        faces: &'a [Face],
    },
    /// Vertex positions changed; faces are the same as last `ModelLoaded`
    ModelUpdated { vertices: &'a [Point3<f32>] },
    LoadFailed { error: &'a ParseError, path: &'a Path },
}

type Observer = Box<dyn FnMut(Notification<'_>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Empty,
    Loaded,
}

#[derive(Default)]
pub struct TransformEngine {
    mesh: Option<MeshData>,
    accumulator: TransformAccumulator,
    observers: Vec<Observer>,
}

impl TransformEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback that receives every notification from now on
    pub fn subscribe(&mut self, observer: impl FnMut(Notification<'_>) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> EngineState {
        match self.mesh {
            Some(_) => EngineState::Loaded,
            None => EngineState::Empty,
        }
    }

    pub fn mesh(&self) -> Option<&MeshData> {
        self.mesh.as_ref()
    }

    pub fn pending(&self) -> &TransformParameters {
        self.accumulator.pending()
    }

    /// Parse `path` and replace the current mesh.
    ///
    /// On failure the previous mesh, if any, stays loaded and observers get
    /// `LoadFailed`.
    pub fn load_model(&mut self, path: impl AsRef<Path>) -> ParseResult<()> {
        let path = path.as_ref();
        match obj::parse_file(path) {
            Ok(mesh) => {
                info!(
                    path = %path.display(),
                    vertices = mesh.vertex_count(),
                    faces = mesh.face_count(),
                    "model loaded"
                );
                self.accumulator = TransformAccumulator::new();
                let mesh = self.mesh.insert(mesh);
                notify(
                    &mut self.observers,
                    Notification::ModelLoaded {
                        vertices: mesh.vertices(),
                        faces: mesh.faces(),
                    },
                );
                Ok(())
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to load model");
                notify(
                    &mut self.observers,
                    Notification::LoadFailed {
                        error: &error,
                        path,
                    },
                );
                Err(error)
            }
        }
    }

    pub fn on_move_changed(&mut self, value: f32, axis: Axis) {
        if self.buffer_move(value, axis) {
            self.update_model();
        }
    }

    /// `value` is in degrees
    pub fn on_rotate_changed(&mut self, value: f32, axis: Axis) {
        if self.buffer_rotate(value, axis) {
            self.update_model();
        }
    }

    /// `value` is an absolute uniform factor
    pub fn on_scale_changed(&mut self, value: f32) {
        if self.buffer_scale(value) {
            self.update_model();
        }
    }

    /// Apply everything pending to the mesh and notify observers.
    ///
    /// Pending deltas are consumed even when nothing is loaded. An exact
    /// identity transform is neither applied nor notified.
    pub fn update_model(&mut self) {
        let affine = self.accumulator.consume_and_reset();
        if affine.is_identity(0.0) {
            return;
        }

        let Some(mesh) = self.mesh.as_mut() else {
            debug!("no model loaded, discarding transform");
            return;
        };

        mesh.apply_transform(&affine);
        notify(
            &mut self.observers,
            Notification::ModelUpdated {
                vertices: mesh.vertices(),
            },
        );
    }

    /// Handle one event as its own apply-and-notify cycle
    pub fn handle(&mut self, event: Event) {
        match event {
            // Load failures are reported through `LoadFailed`
            Event::Load(path) => {
                let _ = self.load_model(path);
            }
            Event::Move { value, axis } => self.on_move_changed(value, axis),
            Event::Rotate { value, axis } => self.on_rotate_changed(value, axis),
            Event::Scale(value) => self.on_scale_changed(value),
        }
    }

    /// Accumulate consecutive deltas and apply them in a single cycle.
    ///
    /// Translations and rotations are summed, the last valid scale wins. A
    /// `Load` first applies the deltas collected before it.
    pub fn handle_batch(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            match event {
                Event::Load(path) => {
                    self.update_model();
                    let _ = self.load_model(path);
                }
                Event::Move { value, axis } => {
                    self.buffer_move(value, axis);
                }
                Event::Rotate { value, axis } => {
                    self.buffer_rotate(value, axis);
                }
                Event::Scale(value) => {
                    self.buffer_scale(value);
                }
            }
        }
        self.update_model();
    }

    fn buffer_move(&mut self, value: f32, axis: Axis) -> bool {
        accept(self.accumulator.add_translation(value, axis))
    }

    fn buffer_rotate(&mut self, value: f32, axis: Axis) -> bool {
        accept(self.accumulator.add_rotation(value, axis))
    }

    fn buffer_scale(&mut self, value: f32) -> bool {
        accept(self.accumulator.set_scale(value))
    }
}

impl std::fmt::Debug for TransformEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformEngine")
            .field("mesh", &self.mesh)
            .field("accumulator", &self.accumulator)
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn accept(result: TransformResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(error) => {
            warn!(%error, "ignoring transform input");
            false
        }
    }
}

fn notify(observers: &mut [Observer], notification: Notification<'_>) {
    for observer in observers.iter_mut() {
        observer(notification);
    }
}
