use facet_common::{Camera, ObjectTransform};
use glam::{Mat4, Vec3};

/// Width over height, with a zero height treated as one pixel.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

/// Right-handed perspective projection with a `[0, 1]` depth range.
///
/// `fov` is the vertical field of view in radians.
pub fn projection_matrix(fov: f32, z_near: f32, z_far: f32, aspect: f32) -> Mat4 {
    Mat4::perspective_rh(fov, aspect, z_near, z_far)
}

/// World-to-camera matrix: pitch about X, then yaw about Y, then the negated
/// camera position. Roll is not applied.
pub fn view_matrix(camera: &Camera) -> Mat4 {
    Mat4::from_rotation_x(camera.rotation.x.to_radians())
        * Mat4::from_rotation_y(camera.rotation.y.to_radians())
        * Mat4::from_translation(-camera.position)
}

/// Object-to-world matrix: translate, rotate X/Y/Z by the negated angles,
/// then scale.
pub fn model_matrix(transform: &ObjectTransform) -> Mat4 {
    let r = -transform.rotation;
    Mat4::from_translation(transform.position)
        * Mat4::from_rotation_x(r.x.to_radians())
        * Mat4::from_rotation_y(r.y.to_radians())
        * Mat4::from_rotation_z(r.z.to_radians())
        * Mat4::from_scale(transform.scale)
}

/// `view * model` as a fresh matrix; `view` is left untouched.
pub fn model_view(transform: &ObjectTransform, view: &Mat4) -> Mat4 {
    *view * model_matrix(transform)
}

/// Projection parameters shared by every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    /// Vertical field of view in radians.
    pub fov: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Transformation {
    fn default() -> Self {
        Self {
            fov: 60f32.to_radians(),
            z_near: 0.01,
            z_far: 1000.0,
        }
    }
}

impl Transformation {
    /// Projection for the current drawable size. The aspect ratio is taken
    /// from `width`/`height` on every call so a resize shows up immediately.
    pub fn projection(&self, width: u32, height: u32) -> Mat4 {
        projection_matrix(self.fov, self.z_near, self.z_far, aspect_ratio(width, height))
    }

    pub fn view(&self, camera: &Camera) -> Mat4 {
        view_matrix(camera)
    }

    pub fn model_view(&self, transform: &ObjectTransform, view: &Mat4) -> Mat4 {
        model_view(transform, view)
    }
}

/// Translation column of a matrix.
pub(crate) fn translation_of(m: &Mat4) -> Vec3 {
    m.w_axis.truncate()
}
