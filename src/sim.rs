//! Frame orchestration: every per-frame system, run in one fixed order.
//!
//! The order is deliberate and the pieces depend on it:
//! physics first, then visual mirroring, then controls (reading the new
//! altitude), then thrust (consumed by the next step), then camera, clock,
//! pads, sun. Reordering any of these changes the feel of the craft.

use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::CameraSystem;
use crate::flight::FlightControls;
use crate::helipad::HelipadFleet;
use crate::input::ControlsSnapshot;
use crate::ocean::SeaState;
use crate::params::{ChaseCamera, FlightTuning, PhysicsParams};
use crate::physics::PhysicsWorld;

/// Directional light that trails the helicopter from straight above, so
/// prop shading stays consistent no matter how far the craft flies.
pub struct SunLight {
    pub position: Vec3,
    pub target: Vec3,
}

impl SunLight {
    /// Unit vector from the light toward its target.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

/// All simulation state for one session. No hidden globals; everything a
/// frame touches lives here.
pub struct Simulation {
    pub sea: SeaState,
    /// Wave animation clock (seconds); accumulates the clamped dt, so a
    /// stalled frame advances the sea exactly as far as it advances physics
    pub clock: f32,
    pub flight: FlightControls,
    pub physics: PhysicsWorld,
    pub pads: HelipadFleet,
    pub camera: CameraSystem,
    pub sun: SunLight,

    /// Visual-only rotor blade angle (radians); spins with collective
    pub rotor_spin: f32,

    // Body poses mirrored once per frame for rendering
    pub hull_position: Vec3,
    pub hull_orientation: Quat,
    pub rotor_position: Vec3,
    pub rotor_orientation: Quat,
}

impl Simulation {
    pub fn new(helipad_count: usize, seed: u64, sea_scale: f32) -> Self {
        let mut sea = SeaState::default();
        sea.scale_steepness(sea_scale);

        let physics_params = PhysicsParams::default();
        let mut physics = PhysicsWorld::new(&physics_params);
        let mut rng = StdRng::seed_from_u64(seed);
        let pads = HelipadFleet::scatter(helipad_count, &mut rng, &mut physics, &physics_params);

        let (hull_position, hull_orientation) = physics.hull_pose();
        let (rotor_position, rotor_orientation) = physics.rotor_pose();

        Self {
            sea,
            clock: 0.0,
            flight: FlightControls::new(FlightTuning::default()),
            physics,
            pads,
            camera: CameraSystem::new(ChaseCamera::default()),
            sun: SunLight {
                position: hull_position + Vec3::Y,
                target: hull_position,
            },
            rotor_spin: 0.0,
            hull_position,
            hull_orientation,
            rotor_position,
            rotor_orientation,
        }
    }

    /// Run one frame of simulation; returns the clamped dt that was
    /// actually integrated.
    pub fn advance(&mut self, dt_raw: f32, controls: &ControlsSnapshot) -> f32 {
        let dt = self.physics.step(dt_raw);

        // Mirror the stepped bodies into the poses rendering will draw.
        (self.hull_position, self.hull_orientation) = self.physics.hull_pose();
        (self.rotor_position, self.rotor_orientation) = self.physics.rotor_pose();
        self.rotor_spin += self.flight.thrust.y * dt * 2.0;

        // Controls read the fresh altitude and the rotor's current spin.
        let yaw_rate = self.physics.rotor_yaw_rate();
        let new_yaw_rate = self
            .flight
            .update(controls, dt, self.hull_position.y, yaw_rate);
        self.physics.set_rotor_yaw_rate(new_yaw_rate);
        self.physics.slave_hull_yaw_to_rotor();

        // Thrust set now is integrated by the next step. One frame of lag,
        // invisible at interactive frame rates.
        self.physics.apply_rotor_thrust(self.flight.thrust);

        self.camera.follow(self.hull_position, self.hull_orientation);

        self.clock += dt;
        self.pads
            .ride_waves(&self.sea, self.clock, dt, &mut self.physics);

        self.sun.position = self.hull_position + Vec3::Y;
        self.sun.target = self.hull_position;

        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn sim() -> Simulation {
        Simulation::new(4, 42, 1.0)
    }

    #[test]
    fn test_advance_clamps_oversized_frames() {
        let mut sim = sim();
        let dt = sim.advance(10.0, &ControlsSnapshot::default());
        assert_relative_eq!(dt, 0.1);
        assert_relative_eq!(sim.clock, 0.1);
    }

    #[test]
    fn test_clock_accumulates_integrated_time() {
        let mut sim = sim();
        for _ in 0..3 {
            sim.advance(0.05, &ControlsSnapshot::default());
        }
        assert_relative_eq!(sim.clock, 0.15, epsilon = 1e-6);
    }

    #[test]
    fn test_identical_runs_stay_identical() {
        let mut a = Simulation::new(6, 9, 1.0);
        let mut b = Simulation::new(6, 9, 1.0);
        let climb = ControlsSnapshot {
            climb: true,
            ..Default::default()
        };
        for _ in 0..120 {
            a.advance(DT, &climb);
            b.advance(DT, &climb);
        }
        assert_eq!(a.hull_position, b.hull_position);
        assert_eq!(a.hull_orientation, b.hull_orientation);
        assert_eq!(a.flight.thrust, b.flight.thrust);
    }

    #[test]
    fn test_rotor_spin_follows_collective() {
        let mut sim = sim();
        sim.advance(DT, &ControlsSnapshot::default());
        // Initial lift is 5 N and the spawn sits below the hold altitude,
        // so the first frame spins by 5 * dt * 2.
        assert_relative_eq!(sim.rotor_spin, 5.0 * DT * 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sun_trails_the_hull() {
        let mut sim = sim();
        let climb = ControlsSnapshot {
            climb: true,
            ..Default::default()
        };
        for _ in 0..30 {
            sim.advance(DT, &climb);
        }
        assert_eq!(sim.sun.target, sim.hull_position);
        assert_eq!(sim.sun.position, sim.hull_position + Vec3::Y);
        assert_relative_eq!(sim.sun.direction().y, -1.0);
    }

    #[test]
    fn test_altitude_hold_engages_after_a_climb() {
        let mut sim = sim();
        let climb = ControlsSnapshot {
            climb: true,
            ..Default::default()
        };
        // Ten seconds of full collective: lift saturates at 40 N and the
        // craft is well above the hold altitude.
        for _ in 0..600 {
            sim.advance(DT, &climb);
        }
        assert!(
            sim.hull_position.y > 4.0,
            "expected a climb, hull at y = {}",
            sim.hull_position.y
        );

        sim.advance(DT, &ControlsSnapshot::default());
        assert_eq!(sim.flight.thrust.y, 14.7);
    }
}
