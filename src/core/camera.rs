//! Camera for 3D rendering

use crate::core::types::{Vec3, Mat4, Quat};

/// Camera with position, rotation, and projection parameters
pub struct Camera {
    /// World position
    pub position: Vec3,
    /// Rotation as quaternion
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(position: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near: 0.01,
            far: 1000.0,
        }
    }

    /// Create camera looking at a target
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - position).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        let rotation = Quat::from_mat3(&glam::Mat3::from_cols(right, up, -forward));

        Self {
            position,
            rotation,
            fov_y: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.01,
            far: 1000.0,
        }
    }

    /// Get view matrix (world to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-self.position);
        rotation_matrix * translation_matrix
    }

    /// Get projection matrix (camera to clip space)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get forward direction (negative Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get right direction (positive X in camera space)
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Update aspect ratio (call on window resize)
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height;
    }

    /// Orbit around a target, keeping the current distance.
    pub fn orbit(&mut self, target: Vec3, yaw_delta: f32, pitch_delta: f32) {
        let offset = self.position - target;
        let radius = offset.length();
        let mut yaw = offset.z.atan2(offset.x);
        let mut pitch = (offset.y / radius).asin();

        yaw += yaw_delta;
        pitch = (pitch + pitch_delta).clamp(-1.4, 1.4);

        self.position = target
            + Vec3::new(
                radius * pitch.cos() * yaw.cos(),
                radius * pitch.sin(),
                radius * pitch.cos() * yaw.sin(),
            );
        self.rotation = Self::look_at(self.position, target, Vec3::Y).rotation;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(1.0, 0.75, 1.0), 60.0, 16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_at_faces_target() {
        let cam = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let f = cam.forward();
        assert!((f - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_orbit_preserves_distance() {
        let mut cam = Camera::look_at(Vec3::new(2.0, 1.0, 0.0), Vec3::ZERO, Vec3::Y);
        let before = cam.position.length();
        cam.orbit(Vec3::ZERO, 0.3, 0.1);
        assert!((cam.position.length() - before).abs() < 1e-4);
    }
}
