//! Rendering and recording configuration.

use glam::Vec3;

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (meters)
    pub near_plane_m: f32,

    /// Far clipping plane (meters)
    /// Past the ocean patch rim (~2400m) so the disc edge stays hidden
    pub far_plane_m: f32,

    /// Sun height above the horizon (degrees); low sun, long glints
    pub sun_elevation_deg: f32,

    /// Sun compass heading (degrees)
    pub sun_azimuth_deg: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 55.0,
            near_plane_m: 1.0,
            far_plane_m: 4000.0,
            sun_elevation_deg: 2.0,
            sun_azimuth_deg: 180.0,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height as f32
    }

    /// Unit vector pointing from the scene toward the sun, shared by the
    /// sky, ocean, and prop shaders so everything agrees on where the
    /// light comes from.
    pub fn sun_direction(&self) -> Vec3 {
        let phi = (90.0 - self.sun_elevation_deg).to_radians();
        let theta = self.sun_azimuth_deg.to_radians();
        Vec3::new(
            phi.sin() * theta.sin(),
            phi.cos(),
            phi.sin() * theta.cos(),
        )
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames
    pub output_dir: String,

    /// Frame rate (FPS)
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: "recording".to_string(),
            fps: 60,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sun_sits_low_to_the_south() {
        let sun = RenderConfig::default().sun_direction();
        assert_relative_eq!(sun.length(), 1.0, epsilon = 1e-6);
        // Elevation 2°: barely above the horizon
        assert_relative_eq!(sun.y, 2.0_f32.to_radians().sin(), epsilon = 1e-5);
        // Azimuth 180°: toward -z
        assert!(sun.z < -0.9);
        assert_relative_eq!(sun.x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_recording_frame_count() {
        let config = RecordingConfig::new(2.5);
        assert_eq!(config.total_frames(), 150);
        assert_eq!(config.frames_dir(), "recording/frames");
    }
}
