//! Free-fly perspective camera

use glam::{Mat4, Vec3};

use super::frustum::Frustum;

/// 89 degrees
const MAX_PITCH: f32 = 1.553_343;

/// Perspective camera for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Unit view direction
    pub direction: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Rotation around Y, 0 looks down -Z
    yaw: f32,
    /// Rotation above the horizon
    pitch: f32,
}

impl Camera {
    /// Camera at (0, 0, 5) looking down -Z
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Create a camera at a specific position looking at a target
    pub fn look_at(position: Vec3, target: Vec3) -> Self {
        let mut camera = Self {
            position,
            ..Self::new()
        };
        let direction = (target - position).normalize_or(Vec3::NEG_Z);
        camera.yaw = (-direction.x).atan2(-direction.z);
        camera.pitch = direction.y.clamp(-1.0, 1.0).asin().clamp(-MAX_PITCH, MAX_PITCH);
        camera.update_direction();
        camera
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.direction, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Culling volume for the current view
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection_matrix())
    }

    /// Update aspect ratio
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Set vertical field of view and depth range
    pub fn set_perspective(&mut self, fov: f32, near: f32, far: f32) {
        self.fov = fov;
        self.near = near;
        self.far = far;
    }

    /// Turn by yaw/pitch deltas in radians; positive yaw turns left,
    /// positive pitch looks up
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.yaw += yaw;
        self.pitch = (self.pitch + pitch).clamp(-MAX_PITCH, MAX_PITCH);
        self.update_direction();
    }

    fn update_direction(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.direction = Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch);
    }

    /// Get the right vector
    pub fn right(&self) -> Vec3 {
        self.direction.cross(self.up).normalize_or(Vec3::X)
    }

    /// Get the forward vector (same as direction)
    pub fn forward(&self) -> Vec3 {
        self.direction
    }

    /// Move camera forward/backward
    pub fn move_forward(&mut self, amount: f32) {
        self.position += self.direction * amount;
    }

    /// Move camera left/right
    pub fn move_right(&mut self, amount: f32) {
        self.position += self.right() * amount;
    }

    /// Move camera up/down (world space)
    pub fn move_up(&mut self, amount: f32) {
        self.position += Vec3::Y * amount;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_keeps_unit_direction() {
        let mut camera = Camera::new();
        camera.rotate(std::f32::consts::FRAC_PI_2, 0.0);
        assert!(camera.direction.abs_diff_eq(Vec3::NEG_X, 1e-5));

        camera.rotate(0.0, 10.0);
        assert!((camera.direction.length() - 1.0).abs() < 1e-5);
        assert!(camera.direction.y < 1.0);
    }

    #[test]
    fn test_look_at() {
        let camera = Camera::look_at(Vec3::new(0.0, 2.0, 8.0), Vec3::new(0.0, 2.0, 0.0));
        assert!(camera.direction.abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_frustum_sees_forward() {
        let mut camera = Camera::new();
        camera.set_perspective(0.4 * std::f32::consts::PI, 0.1, 500.0);
        camera.set_aspect(1280, 720);
        let frustum = camera.frustum();
        assert!(frustum.contains_point(camera.position + camera.forward() * 10.0));
        assert!(!frustum.contains_point(camera.position - camera.forward() * 10.0));
        assert!(!frustum.contains_point(camera.position + camera.forward() * 600.0));
    }
}
