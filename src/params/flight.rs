//! Helicopter control tuning.

use glam::Vec3;

/// Rate limits and clamps for the four control axes.
///
/// Thrust is a vector in the rotor's local frame: x banks, y lifts,
/// z pitches. Each axis integrates at a fixed rate while its key is held
/// and relaxes back toward zero when released (lift holds instead of
/// relaxing).
#[derive(Debug, Clone)]
pub struct FlightTuning {
    /// Collective (lift) change rate (newtons per second)
    pub collective_rate_n_per_s: f32,

    /// Collective ceiling (newtons)
    pub collective_max_n: f32,

    /// Lift that exactly cancels gravity on the hull+rotor assembly
    /// (newtons); 1.5 kg total mass under 9.8 m/s² gravity
    pub stable_lift_n: f32,

    /// Altitude above which auto-hover engages (meters)
    pub hold_altitude_m: f32,

    /// Pedal (yaw) acceleration (radians per second squared)
    pub pedal_accel_rad_per_s2: f32,

    /// Yaw rate clamp (radians per second, ±)
    pub yaw_rate_max_rad_per_s: f32,

    /// Yaw rate decay when pedals are centered (radians per second squared)
    pub pedal_relax_rad_per_s2: f32,

    /// Cyclic (pitch/bank) change rate (newtons per second)
    pub cyclic_rate_n_per_s: f32,

    /// Cyclic clamp (newtons, ±)
    pub cyclic_max_n: f32,

    /// Cyclic decay when the stick is centered (newtons per second)
    pub cyclic_relax_n_per_s: f32,

    /// Thrust vector at spawn (newtons, rotor-local)
    pub initial_thrust_n: Vec3,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            collective_rate_n_per_s: 5.0,
            collective_max_n: 40.0,
            stable_lift_n: 14.7, // (0.5 + 1.0) kg * 9.8 m/s²
            hold_altitude_m: 4.0,
            pedal_accel_rad_per_s2: 5.0,
            yaw_rate_max_rad_per_s: 2.0,
            pedal_relax_rad_per_s2: 1.0,
            cyclic_rate_n_per_s: 5.0,
            cyclic_max_n: 10.0,
            cyclic_relax_n_per_s: 2.5,
            initial_thrust_n: Vec3::new(0.0, 5.0, 0.0),
        }
    }
}
