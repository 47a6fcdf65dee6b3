//! Third-person chase camera with exponential smoothing.

use glam::{Mat4, Quat, Vec3};

use crate::params::{ChaseCamera, RenderConfig};

/// Chase camera: one smoothed world position trailing the helicopter.
pub struct CameraSystem {
    params: ChaseCamera,
    position: Vec3,
    target: Vec3,
}

impl CameraSystem {
    /// Create the camera at its establishing position; the first frames of
    /// smoothing fly it in toward the helicopter.
    pub fn new(params: ChaseCamera) -> Self {
        Self {
            position: params.initial_position,
            target: Vec3::ZERO,
            params,
        }
    }

    /// Ease toward the pivot behind the hull and look at the hull.
    ///
    /// The pivot rides in hull-local space, so yawing the helicopter swings
    /// the camera around with it. The pivot is floor-clamped before
    /// smoothing, which keeps the lens from chasing a point under the waves
    /// when the helicopter sits low.
    pub fn follow(&mut self, hull_position: Vec3, hull_orientation: Quat) {
        let mut pivot = hull_position + hull_orientation * self.params.pivot_offset;
        pivot.y = pivot.y.max(self.params.floor_y_m);

        self.position += (pivot - self.position) * self.params.smoothing;
        self.target = hull_position;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// View-projection matrix for rendering plus the eye position for shading.
    pub fn view_proj(&self, render_config: &RenderConfig) -> (Mat4, Vec3) {
        // Y stays up: the chase camera never rolls.
        let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            render_config.aspect_ratio(),
            render_config.near_plane_m,
            render_config.far_plane_m,
        );
        (proj * view, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Smoothing of 1.0 makes the camera land on the pivot in one frame,
    /// which keeps the expected positions exact.
    fn snappy() -> ChaseCamera {
        ChaseCamera {
            smoothing: 1.0,
            ..ChaseCamera::default()
        }
    }

    #[test]
    fn test_eases_a_fixed_fraction_per_frame() {
        let params = ChaseCamera::default();
        let mut camera = CameraSystem::new(params.clone());

        camera.follow(Vec3::ZERO, Quat::IDENTITY);

        let pivot = Vec3::new(0.0, 2.0, 4.0);
        let expected = params.initial_position + (pivot - params.initial_position) * 0.05;
        assert_relative_eq!(camera.position().x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(camera.position().y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(camera.position().z, expected.z, epsilon = 1e-5);
    }

    #[test]
    fn test_pivot_floor_clamp() {
        let mut camera = CameraSystem::new(snappy());

        // Hull low enough that the raw pivot lands at y = 0.5.
        camera.follow(Vec3::new(0.0, -1.5, 0.0), Quat::IDENTITY);
        assert_relative_eq!(camera.position().y, 1.0);
    }

    #[test]
    fn test_pivot_swings_with_hull_yaw() {
        let mut camera = CameraSystem::new(snappy());

        let yawed = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        camera.follow(Vec3::ZERO, yawed);

        assert_relative_eq!(camera.position().x, 4.0, epsilon = 1e-5);
        assert_relative_eq!(camera.position().y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(camera.position().z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_looks_at_the_hull() {
        let mut camera = CameraSystem::new(snappy());
        let hull = Vec3::new(12.0, 5.0, -3.0);
        camera.follow(hull, Quat::IDENTITY);
        assert_eq!(camera.target, hull);
    }

    #[test]
    fn test_view_proj_matrix_generation() {
        let mut camera = CameraSystem::new(ChaseCamera::default());
        camera.follow(Vec3::ZERO, Quat::IDENTITY);

        let (view_proj, eye) = camera.view_proj(&RenderConfig::default());
        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(eye.x.is_finite() && eye.y.is_finite() && eye.z.is_finite());
    }
}
