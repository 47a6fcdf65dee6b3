//! Chase camera configuration.

use glam::Vec3;

/// Third-person chase camera parameters.
///
/// Each frame the camera eases toward a pivot point fixed in the hull's
/// local frame (behind and above the helicopter), clamped so it never
/// dips into the waves, and always looks at the hull.
#[derive(Debug, Clone)]
pub struct ChaseCamera {
    /// Pivot offset in hull-local space (meters): above and behind
    pub pivot_offset: Vec3,

    /// Camera never goes below this world height (meters)
    pub floor_y_m: f32,

    /// Fraction of the remaining distance covered per frame (0..1);
    /// frame-rate dependent by design, matching the feel it was tuned at
    pub smoothing: f32,

    /// Camera position before the first frame pulls it in (meters);
    /// starting far away gives an establishing fly-in shot
    pub initial_position: Vec3,
}

impl Default for ChaseCamera {
    fn default() -> Self {
        Self {
            pivot_offset: Vec3::new(0.0, 2.0, 4.0),
            floor_y_m: 1.0,
            smoothing: 0.05,
            initial_position: Vec3::new(30.0, 30.0, 100.0),
        }
    }
}
