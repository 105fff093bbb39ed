//! Shared types: the camera, per-object transform records and scene objects.
//!
//! All angles stored here are Euler degrees. Conversion to radians happens
//! in the transform pipeline, right before a matrix is built.

pub mod types;

pub use types::{Camera, ObjectTransform, SceneObject};
