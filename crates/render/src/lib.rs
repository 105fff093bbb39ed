//! Rendering adapter: the camera/object transformation pipeline and a
//! renderer-agnostic draw interface.
//!
//! # Invariants
//! - Every matrix is recomputed from current state on each call; nothing is
//!   cached between frames.
//! - Angles are degrees at the API boundary.
//! - Renderers read scene objects; they never mutate them.

mod renderer;
pub mod transformation;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use transformation::{
    Transformation, aspect_ratio, model_matrix, model_view, projection_matrix, view_matrix,
};

pub fn crate_info() -> &'static str {
    "facet-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
