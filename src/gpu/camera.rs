//! Orbit camera and projection for the particle view.

use glam::{Mat4, Vec3};

use crate::config::RenderConfig;

const ORBIT_SPEED: f32 = 0.005;
const ZOOM_SPEED: f32 = 0.3;
const PITCH_LIMIT: f32 = 1.5;
const MIN_DISTANCE: f32 = 0.5;

/// Orbit camera looking at the fountain.
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    fov_y: f32,
    near: f32,
    far: f32,
}

impl Camera {
    pub fn new(render: &RenderConfig) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.3,
            distance: render.camera_distance,
            target: Vec3::new(0.0, 1.0, 0.0),
            fov_y: render.fov_degrees.to_radians(),
            near: render.near,
            far: render.far,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }

    /// Rotate by a mouse drag of `dx`, `dy` pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * ORBIT_SPEED;
        self.pitch = (self.pitch + dy * ORBIT_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move towards the target by `scroll` wheel lines.
    ///
    /// The camera never leaves the far half of the view volume.
    pub fn zoom(&mut self, scroll: f32) {
        let max_distance = (self.far * 0.5).max(MIN_DISTANCE);
        self.distance = (self.distance - scroll * ZOOM_SPEED).clamp(MIN_DISTANCE, max_distance);
    }
}
