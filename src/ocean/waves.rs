//! Gerstner wave field shared by CPU sampling and the GPU vertex stage.
//!
//! The same three-wave trochoidal sum runs in two places: here, where
//! floating objects sample the surface, and in `shaders/ocean.wgsl`, where
//! every ocean vertex is displaced. Both sides are fed from one [`SeaState`],
//! re-packed into shader uniforms every frame, so a runtime edit to a wave
//! can never leave physics and rendering disagreeing.

use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

/// Gravity constant for the deep-water dispersion relation (m/s²)
pub const GRAVITY: f32 = 9.8;

/// A single trochoidal wave train.
#[derive(Debug, Clone, Copy)]
pub struct Wave {
    /// Travel heading (degrees)
    pub direction_deg: f32,

    /// Crest sharpness (dimensionless); amplitude works out to steepness / k.
    /// Keep it at or below 1 or crests loop over themselves
    pub steepness: f32,

    /// Crest-to-crest wavelength (meters, must be > 0: divided by)
    pub wavelength: f32,
}

impl Wave {
    pub const fn new(direction_deg: f32, steepness: f32, wavelength: f32) -> Self {
        Self {
            direction_deg,
            steepness,
            wavelength,
        }
    }

    /// Horizontal travel direction as a unit vector over (x, z).
    fn direction(&self) -> Vec2 {
        let rad = self.direction_deg.to_radians();
        Vec2::new(rad.sin(), -rad.cos())
    }

    /// Pack for the shader uniform: [sin dir, cos dir, steepness, wavelength].
    ///
    /// The WGSL stage rebuilds the direction as `vec2(w.x, -w.y)`, which is
    /// exactly [`Wave::direction`]. Packing the trig terms instead of the
    /// angle keeps degree/radian conversion out of the shader.
    pub fn packed(&self) -> [f32; 4] {
        let rad = self.direction_deg.to_radians();
        [rad.sin(), rad.cos(), self.steepness, self.wavelength]
    }
}

/// One surface sample: where a rest-position point ends up and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSample {
    /// Displacement from the rest position (meters); trochoidal waves push
    /// points horizontally as well as vertically
    pub offset: Vec3,

    /// Unit surface normal
    pub normal: Vec3,
}

/// The canonical sea parameter set: exactly three wave trains.
///
/// Fields are public and mutable at runtime; the renderer re-packs them into
/// uniforms every frame, so edits take effect immediately on both the mesh
/// and anything floating on it.
#[derive(Debug, Clone)]
pub struct SeaState {
    pub waves: [Wave; 3],
}

impl Default for SeaState {
    fn default() -> Self {
        Self {
            waves: [
                Wave::new(45.0, 0.1, 7.0),   // chop
                Wave::new(306.0, 0.2, 32.0), // mid swell
                Wave::new(196.0, 0.3, 59.0), // long rollers
            ],
        }
    }
}

impl SeaState {
    /// Scale every wave's steepness by `factor` (the `--sea-scale` flag).
    pub fn scale_steepness(&mut self, factor: f32) {
        for wave in &mut self.waves {
            wave.steepness *= factor;
        }
    }

    /// Packed uniforms for all three waves, shader order.
    pub fn packed(&self) -> [[f32; 4]; 3] {
        [
            self.waves[0].packed(),
            self.waves[1].packed(),
            self.waves[2].packed(),
        ]
    }

    /// Sample the displaced surface at rest position (x, z) and time t (s).
    ///
    /// Pure arithmetic over the inputs: identical arguments always return
    /// bit-identical samples. The formula mirrors `gerstner()` in
    /// `shaders/ocean.wgsl` term for term.
    pub fn evaluate(&self, x: f32, z: f32, t: f32) -> WaveSample {
        let pos = Vec2::new(x, z);
        let mut offset = Vec3::ZERO;
        let mut tangent = Vec3::new(1.0, 0.0, 0.0);
        let mut binormal = Vec3::new(0.0, 0.0, 1.0);

        for wave in &self.waves {
            let k = TAU / wave.wavelength;
            let c = (GRAVITY / k).sqrt(); // phase speed from dispersion
            let d = wave.direction();
            let f = k * (d.dot(pos) - c * t);
            let a = wave.steepness / k;
            let (sin_f, cos_f) = f.sin_cos();
            let s = wave.steepness;

            // d.y drives x and d.x drives z, same as the WGSL sum.
            offset.x += d.y * (a * cos_f);
            offset.y += a * sin_f;
            offset.z += d.x * (a * cos_f);

            tangent += Vec3::new(
                -d.x * d.x * s * sin_f,
                d.x * s * cos_f,
                -d.x * d.y * s * sin_f,
            );
            binormal += Vec3::new(
                -d.x * d.y * s * sin_f,
                d.y * s * cos_f,
                -d.y * d.y * s * sin_f,
            );
        }

        WaveSample {
            offset,
            normal: binormal.cross(tangent).normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Waves with zero steepness contribute nothing, so this isolates one train.
    fn single_wave(direction_deg: f32, steepness: f32, wavelength: f32) -> SeaState {
        SeaState {
            waves: [
                Wave::new(direction_deg, steepness, wavelength),
                Wave::new(0.0, 0.0, 1.0),
                Wave::new(0.0, 0.0, 1.0),
            ],
        }
    }

    #[test]
    fn test_golden_sample_at_origin() {
        // Hand-derived for {45°, 0.1, 7}: at the origin and t = 0 the phase
        // is zero, so the point is pushed horizontally by a = S/k along
        // (d.y, d.x) with no height change, and the normal tips against the
        // travel direction.
        let sea = single_wave(45.0, 0.1, 7.0);
        let sample = sea.evaluate(0.0, 0.0, 0.0);

        let a = 0.7 / TAU; // steepness / k = 0.1 * 7 / 2π
        let inv_sqrt2 = std::f32::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(sample.offset.x, -a * inv_sqrt2, epsilon = 1e-6);
        assert_relative_eq!(sample.offset.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(sample.offset.z, a * inv_sqrt2, epsilon = 1e-6);

        assert_relative_eq!(sample.normal.x, -0.0703598, epsilon = 1e-5);
        assert_relative_eq!(sample.normal.y, 0.9950372, epsilon = 1e-5);
        assert_relative_eq!(sample.normal.z, 0.0703598, epsilon = 1e-5);
    }

    #[test]
    fn test_flat_sea_has_up_normal_and_no_offset() {
        let sea = single_wave(0.0, 0.0, 1.0);
        let sample = sea.evaluate(12.0, -7.5, 3.0);
        assert_eq!(sample.offset, Vec3::ZERO);
        assert_eq!(sample.normal, Vec3::Y);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let sea = SeaState::default();
        let first = sea.evaluate(31.25, -44.0, 17.3);
        let second = sea.evaluate(31.25, -44.0, 17.3);
        // Bit-identical, not merely close: floating pads rely on replayable
        // sampling.
        assert_eq!(first, second);
    }

    #[test]
    fn test_surface_moves_with_time() {
        let sea = SeaState::default();
        let before = sea.evaluate(5.0, 5.0, 0.0);
        let after = sea.evaluate(5.0, 5.0, 1.0);
        assert!((before.offset.y - after.offset.y).abs() > 1e-3);
    }

    #[test]
    fn test_normal_is_unit_length() {
        let sea = SeaState::default();
        for &(x, z, t) in &[(0.0, 0.0, 0.0), (100.0, -250.0, 8.0), (3.7, 9.1, 123.4)] {
            let sample = sea.evaluate(x, z, t);
            assert_relative_eq!(sample.normal.length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_packed_matches_cpu_direction() {
        let sea = SeaState::default();
        for wave in &sea.waves {
            let packed = wave.packed();
            // The shader reconstructs the direction as vec2(w.x, -w.y).
            let shader_dir = Vec2::new(packed[0], -packed[1]);
            assert_relative_eq!(shader_dir.x, wave.direction().x, epsilon = 1e-6);
            assert_relative_eq!(shader_dir.y, wave.direction().y, epsilon = 1e-6);
            assert_eq!(packed[2], wave.steepness);
            assert_eq!(packed[3], wave.wavelength);
        }
    }

    #[test]
    fn test_scale_steepness() {
        let mut sea = SeaState::default();
        sea.scale_steepness(0.5);
        assert_relative_eq!(sea.waves[0].steepness, 0.05, epsilon = 1e-6);
        assert_relative_eq!(sea.waves[1].steepness, 0.1, epsilon = 1e-6);
        assert_relative_eq!(sea.waves[2].steepness, 0.15, epsilon = 1e-6);
    }
}
