//! Ocean patch mesh parameters.

/// Geometry of the visible ocean patch.
///
/// The patch is a radial disc: rings of vertices around the origin with a
/// geometrically growing gap between rings, so the mesh is dense under the
/// helicopter and coarse toward the horizon. The patch is re-centered under
/// the helicopter every frame and the wave phase is offset to compensate, so
/// the bounded mesh reads as an infinite sea.
#[derive(Debug, Clone)]
pub struct OceanPatch {
    /// Vertices per ring (angular resolution)
    pub theta_segments: usize,

    /// Number of rings outward from the center
    pub rings: usize,

    /// Gap between the center and the first ring (meters)
    pub base_ring_step_m: f32,

    /// Multiplier applied to the ring gap per ring (> 1 pushes the outer
    /// rings far out; 1.005 over 512 rings reaches ~2.4 km)
    pub ring_growth: f32,
}

impl Default for OceanPatch {
    fn default() -> Self {
        Self {
            theta_segments: 128,
            rings: 512,
            base_ring_step_m: 1.0,
            ring_growth: 1.005,
        }
    }
}

impl OceanPatch {
    /// Outer radius of the disc (meters), for sanity checks against the far plane.
    pub fn outer_radius_m(&self) -> f32 {
        let mut radius = 0.0f32;
        let mut step = self.base_ring_step_m;
        for _ in 0..self.rings {
            radius += step;
            step *= self.ring_growth;
        }
        radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patch_reaches_past_the_far_plane_fraction() {
        let patch = OceanPatch::default();
        let radius = patch.outer_radius_m();
        // Dense enough near the center, far enough out to hide the rim.
        assert!(radius > 2000.0, "outer radius too small: {radius}");
        assert!(radius < 10_000.0, "outer radius runaway: {radius}");
    }
}
