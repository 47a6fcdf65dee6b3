//! Rigid body and world parameters.

use glam::Vec3;

/// Physics world constants: gravity, body shapes, masses, damping.
///
/// The helicopter is two bodies joined by a ball joint: a light hull that
/// carries the collider and a heavier rotor above it where thrust is
/// applied. Pushing the heavy rotor drags the hull along underneath,
/// which gives the pendulum-like hover feel without any explicit
/// stabilization.
#[derive(Debug, Clone)]
pub struct PhysicsParams {
    /// Gravity acceleration (m/s², negative = down)
    pub gravity_y: f32,

    /// Hull box collider half-extents (meters)
    pub hull_half_extents: Vec3,

    /// Hull mass (kg)
    pub hull_mass_kg: f32,

    /// Hull angular damping (dimensionless; high = resists tumbling)
    pub hull_angular_damping: f32,

    /// Rotor ball collider radius (meters)
    pub rotor_radius_m: f32,

    /// Rotor mass (kg)
    pub rotor_mass_kg: f32,

    /// Rotor linear damping (dimensionless; bleeds off lateral drift)
    pub rotor_linear_damping: f32,

    /// Joint anchor on the hull, hull-local (meters)
    pub rotor_anchor: Vec3,

    /// Hull spawn position (meters)
    pub hull_spawn: Vec3,

    /// Helipad box collider half-extents (meters)
    pub pad_half_extents: Vec3,

    /// Height pads are dropped from at scatter time (meters)
    pub pad_spawn_height_m: f32,

    /// Pads scatter uniformly in [-h, h) on x and z (meters)
    pub pad_scatter_half_extent_m: f32,

    /// Longest timestep a single physics step will integrate (seconds);
    /// larger frame deltas are clamped so a stall cannot explode the solver
    pub max_step_dt_s: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity_y: -9.82,
            hull_half_extents: Vec3::new(0.6, 0.5, 0.6),
            hull_mass_kg: 0.5,
            hull_angular_damping: 0.9,
            rotor_radius_m: 0.1,
            rotor_mass_kg: 1.0,
            rotor_linear_damping: 0.5,
            rotor_anchor: Vec3::new(0.0, 1.0, 0.0),
            hull_spawn: Vec3::new(0.0, 2.0, 0.0),
            pad_half_extents: Vec3::new(2.5, 0.5, 2.5),
            pad_spawn_height_m: 20.0,
            pad_scatter_half_extent_m: 250.0,
            max_step_dt_s: 0.1,
        }
    }
}
