use crate::platform::DesktopPlatform;
use facet_assets::{MeshData, TextureData, load_obj};
use facet_common::{Camera, ObjectTransform, SceneObject};
use facet_input::Action;
use facet_kernel::{BoxError, Game};
use facet_render_wgpu::{GpuMesh, GpuTexture};
use std::path::PathBuf;
use std::sync::Arc;

/// World units per second.
pub const CAMERA_SPEED: f32 = 2.0;
/// Degrees per pixel per second of mouse travel.
pub const MOUSE_SENSITIVITY: f32 = 5.0;
/// Degrees per second the near object spins around y.
const SPIN_RATE: f32 = 45.0;

/// Where the showcase gets its mesh and texture.
#[derive(Debug, Clone, Default)]
pub struct SceneSource {
    pub obj: Option<PathBuf>,
    pub texture: Option<PathBuf>,
}

/// Two copies of one textured mesh and a free-fly camera.
pub struct Showcase {
    source: SceneSource,
    camera: Camera,
    objects: Vec<SceneObject<GpuMesh>>,
    previous: Vec<ObjectTransform>,
    mesh: Option<Arc<GpuMesh>>,
    texture: Option<Arc<GpuTexture>>,
    // interpolated copies handed to the renderer
    frame: Vec<SceneObject<GpuMesh>>,
}

impl Showcase {
    pub fn new(source: SceneSource) -> Self {
        Self {
            source,
            camera: Camera::default(),
            objects: Vec::new(),
            previous: Vec::new(),
            mesh: None,
            texture: None,
            frame: Vec::new(),
        }
    }

    fn load_assets(&self) -> Result<(MeshData, TextureData), BoxError> {
        let mesh = match &self.source.obj {
            Some(path) => load_obj(path)?,
            None => MeshData::textured_quad(),
        };
        let texture = match &self.source.texture {
            Some(path) => TextureData::load(path)?,
            None => TextureData::checkerboard(64, 8),
        };
        Ok((mesh, texture))
    }
}

/// Apply one tick of input actions to the camera. Returns true on close.
pub fn apply_actions(camera: &mut Camera, actions: &[Action], dt: f32) -> bool {
    let mut close = false;
    for action in actions {
        match action.scaled(dt) {
            Action::Move(offset) => {
                let step = offset * CAMERA_SPEED;
                camera.move_position(step.x, step.y, step.z);
            }
            Action::Look(delta) => {
                let turn = delta * MOUSE_SENSITIVITY;
                camera.move_rotation(turn.x, turn.y, 0.0);
            }
            Action::Close => close = true,
        }
    }
    close
}

impl Game<DesktopPlatform> for Showcase {
    fn initialize(&mut self, platform: &mut DesktopPlatform) -> Result<(), BoxError> {
        let (mesh_data, texture_data) = self.load_assets()?;
        let texture = platform.upload_texture(&texture_data)?;
        let mesh = Arc::new(
            platform
                .upload_mesh(&mesh_data)?
                .with_texture(Arc::clone(&texture)),
        );

        let mut near = SceneObject::new(Arc::clone(&mesh));
        near.set_position(0.0, 0.0, -2.0);
        let mut far = SceneObject::new(Arc::clone(&mesh));
        far.set_position(-2.0, 0.0, -6.0);
        self.objects = vec![near, far];
        self.previous = self.objects.iter().map(|o| o.transform).collect();
        self.mesh = Some(mesh);
        self.texture = Some(texture);

        tracing::info!(
            triangles = mesh_data.triangle_count(),
            texture = %format!("{}x{}", texture_data.width, texture_data.height),
            "showcase ready"
        );
        Ok(())
    }

    fn update(&mut self, platform: &mut DesktopPlatform, dt: f64) {
        let dt = dt as f32;
        platform.input_mut().mouse.update();
        let actions = platform.input().actions();
        if apply_actions(&mut self.camera, &actions, dt) {
            platform.request_close();
        }

        self.previous = self.objects.iter().map(|o| o.transform).collect();
        if let Some(near) = self.objects.first_mut() {
            near.transform.rotation.y += SPIN_RATE * dt;
        }
    }

    fn render(&mut self, platform: &mut DesktopPlatform, alpha: f64) {
        self.frame.clear();
        for (object, prev) in self.objects.iter().zip(&self.previous) {
            let mut blended = object.clone();
            blended.transform =
                ObjectTransform::interpolate(prev, &object.transform, alpha as f32);
            self.frame.push(blended);
        }
        platform.draw(&self.frame, &self.camera);
    }

    fn dispose(&mut self, _platform: &mut DesktopPlatform) {
        self.frame.clear();
        self.objects.clear();
        if let Some(mesh) = self.mesh.take() {
            mesh.destroy();
        }
        if let Some(texture) = self.texture.take() {
            texture.destroy();
        }
        tracing::debug!("showcase resources released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    #[test]
    fn move_scales_by_speed_and_dt() {
        let mut camera = Camera::default();
        let close = apply_actions(&mut camera, &[Action::Move(Vec3::new(0.0, 1.0, 0.0))], 0.5);
        assert!(!close);
        assert!((camera.position.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn look_turns_pitch_and_yaw() {
        let mut camera = Camera::default();
        apply_actions(&mut camera, &[Action::Look(Vec2::new(2.0, -4.0))], 0.1);
        assert!((camera.rotation.x - 1.0).abs() < 1e-5);
        assert!((camera.rotation.y + 2.0).abs() < 1e-5);
        assert_eq!(camera.rotation.z, 0.0);
    }

    #[test]
    fn close_action_is_reported() {
        let mut camera = Camera::default();
        assert!(apply_actions(&mut camera, &[Action::Close], 0.016));
        assert_eq!(camera, Camera::default());
    }
}
