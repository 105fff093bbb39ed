use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Viewer position and orientation.
///
/// Rotation is Euler degrees: `x` is pitch, `y` is yaw, `z` is roll. Roll is
/// carried but not used when the view matrix is composed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    /// Move relative to the current yaw heading.
    ///
    /// `dz` walks forward/backward along the heading, `dx` strafes
    /// perpendicular to it and `dy` is applied straight to the height.
    pub fn move_position(&mut self, dx: f32, dy: f32, dz: f32) {
        if dz != 0.0 {
            let yaw = self.rotation.y.to_radians();
            self.position.x += -yaw.sin() * dz;
            self.position.z += yaw.cos() * dz;
        }
        if dx != 0.0 {
            let strafe = (self.rotation.y - 90.0).to_radians();
            self.position.x += -strafe.sin() * dx;
            self.position.z += strafe.cos() * dx;
        }
        self.position.y += dy;
    }

    pub fn move_rotation(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation += Vec3::new(dx, dy, dz);
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vec3::new(x, y, z);
    }
}

/// Per-object placement: position, Euler rotation in degrees, non-uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectTransform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl ObjectTransform {
    /// Blend two simulation states for rendering. `alpha` is the fraction of
    /// a fixed interval already accumulated past `prev`.
    pub fn interpolate(prev: &Self, next: &Self, alpha: f32) -> Self {
        Self {
            position: prev.position.lerp(next.position, alpha),
            rotation: prev.rotation.lerp(next.rotation, alpha),
            scale: prev.scale.lerp(next.scale, alpha),
        }
    }
}

/// A placed instance of a shared mesh.
///
/// The mesh is reference counted and never owned by a single object; many
/// objects may draw the same mesh. Releasing the mesh's backing resources is
/// the owner's explicit job, not something dropping an object does.
#[derive(Debug)]
pub struct SceneObject<M> {
    pub transform: ObjectTransform,
    mesh: Arc<M>,
}

impl<M> Clone for SceneObject<M> {
    fn clone(&self) -> Self {
        Self {
            transform: self.transform,
            mesh: Arc::clone(&self.mesh),
        }
    }
}

impl<M> SceneObject<M> {
    pub fn new(mesh: Arc<M>) -> Self {
        Self {
            transform: ObjectTransform::default(),
            mesh,
        }
    }

    pub fn mesh(&self) -> &Arc<M> {
        &self.mesh
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.transform.position = Vec3::new(x, y, z);
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.transform.rotation = Vec3::new(x, y, z);
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.transform.scale = Vec3::new(x, y, z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn transform_default_is_identity() {
        let t = ObjectTransform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn camera_walks_along_heading() {
        let mut cam = Camera::default();
        cam.move_position(0.0, 0.0, 1.0);
        assert!(approx(cam.position, Vec3::new(0.0, 0.0, 1.0)));

        let mut turned = Camera::new(Vec3::ZERO, Vec3::new(0.0, 90.0, 0.0));
        turned.move_position(0.0, 0.0, 1.0);
        assert!(approx(turned.position, Vec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn camera_strafes_perpendicular() {
        let mut cam = Camera::default();
        cam.move_position(1.0, 0.0, 0.0);
        assert!(approx(cam.position, Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn camera_vertical_move_ignores_heading() {
        let mut cam = Camera::new(Vec3::ZERO, Vec3::new(30.0, 45.0, 0.0));
        cam.move_position(0.0, 2.5, 0.0);
        assert!(approx(cam.position, Vec3::new(0.0, 2.5, 0.0)));
    }

    #[test]
    fn camera_rotation_accumulates() {
        let mut cam = Camera::default();
        cam.move_rotation(1.0, 2.0, 0.0);
        cam.move_rotation(1.0, -1.0, 0.0);
        assert_eq!(cam.rotation, Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn interpolate_endpoints_and_midpoint() {
        let a = ObjectTransform::default();
        let b = ObjectTransform {
            position: Vec3::new(2.0, 0.0, 0.0),
            rotation: Vec3::new(0.0, 90.0, 0.0),
            scale: Vec3::splat(3.0),
        };
        assert_eq!(ObjectTransform::interpolate(&a, &b, 0.0), a);
        let mid = ObjectTransform::interpolate(&a, &b, 0.5);
        assert!(approx(mid.position, Vec3::new(1.0, 0.0, 0.0)));
        assert!(approx(mid.rotation, Vec3::new(0.0, 45.0, 0.0)));
        assert!(approx(mid.scale, Vec3::splat(2.0)));
    }

    #[test]
    fn objects_share_one_mesh() {
        let mesh = Arc::new("quad");
        let mut a = SceneObject::new(Arc::clone(&mesh));
        let b = SceneObject::new(Arc::clone(&mesh));
        a.set_position(0.0, 0.0, -2.0);
        assert!(Arc::ptr_eq(a.mesh(), b.mesh()));
        assert_eq!(Arc::strong_count(&mesh), 3);
        assert_eq!(b.transform.position, Vec3::ZERO);
    }
}
