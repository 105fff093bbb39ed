use crate::transformation::{Transformation, translation_of};
use facet_common::{Camera, SceneObject};
use std::fmt::Write;

/// Camera and drawable size for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    pub camera: Camera,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            width: 860,
            height: 480,
        }
    }
}

/// Renderer-agnostic interface.
///
/// A renderer reads scene objects and a view, then produces output. It
/// never changes the objects it draws.
pub trait Renderer<M> {
    /// The output type produced by this renderer.
    type Output;

    /// Draw one frame.
    fn draw(&mut self, objects: &[SceneObject<M>], view: &RenderView) -> Self::Output;
}

/// Text renderer for the CLI, logs and tests.
///
/// Prints the camera and, per object, the translation of its model-view
/// matrix: where the object sits relative to the camera.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    transformation: Transformation,
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl<M> Renderer<M> for DebugTextRenderer {
    type Output = String;

    fn draw(&mut self, objects: &[SceneObject<M>], view: &RenderView) -> String {
        self.frames += 1;
        let cam = &view.camera;
        let view_matrix = self.transformation.view(cam);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({}x{}) ===",
            self.frames, view.width, view.height
        );
        let _ = writeln!(out, "Objects: {}", objects.len());
        let _ = writeln!(
            out,
            "Camera: pos=({:.2}, {:.2}, {:.2}) rot=({:.1}, {:.1}, {:.1}) fov={:.0}",
            cam.position.x,
            cam.position.y,
            cam.position.z,
            cam.rotation.x,
            cam.rotation.y,
            cam.rotation.z,
            self.transformation.fov.to_degrees()
        );
        for (i, object) in objects.iter().enumerate() {
            let model_view = self
                .transformation
                .model_view(&object.transform, &view_matrix);
            let t = translation_of(&model_view);
            let _ = writeln!(out, "  [{i}] view=({:.2}, {:.2}, {:.2})", t.x, t.y, t.z);
        }
        tracing::trace!(objects = objects.len(), "debug frame drawn");
        out
    }
}
