//! Floating helipads: scattered once at startup, riding the waves forever.
//!
//! Authority is inverted for these bodies. The wave field decides each pad's
//! pose, the visual shows it, and the pad's kinematic physics body is told
//! to be there. The hull can still land on a pad because the solver treats
//! kinematic bodies as immovable from the dynamic side.

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use rapier3d::prelude::RigidBodyHandle;

use crate::ocean::SeaState;
use crate::params::PhysicsParams;
use crate::physics::PhysicsWorld;

/// Rotate `from` toward `to` by at most `max_angle` radians.
fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_angle || angle < 1e-6 {
        to
    } else {
        from.slerp(to, max_angle / angle)
    }
}

/// One floating pad.
pub struct Helipad {
    /// Scatter position; pads never move horizontally
    pub rest_x: f32,
    pub rest_z: f32,

    /// Pose shown this frame and pushed into the kinematic body
    pub position: Vec3,
    pub orientation: Quat,

    pub body: RigidBodyHandle,
}

/// All pads, synchronized against the sea once per frame.
pub struct HelipadFleet {
    pub pads: Vec<Helipad>,
}

impl HelipadFleet {
    /// Scatter `count` pads uniformly over the spawn square, high above the
    /// water; the first wave sync drops them onto the surface.
    pub fn scatter(
        count: usize,
        rng: &mut impl Rng,
        physics: &mut PhysicsWorld,
        params: &PhysicsParams,
    ) -> Self {
        let half = params.pad_scatter_half_extent_m;
        let mut pads = Vec::with_capacity(count);
        for _ in 0..count {
            let x = rng.gen_range(-half..half);
            let z = rng.gen_range(-half..half);
            let body = physics.add_helipad(x, z);
            pads.push(Helipad {
                rest_x: x,
                rest_z: z,
                position: Vec3::new(x, params.pad_spawn_height_m, z),
                orientation: Quat::IDENTITY,
                body,
            });
        }
        Self { pads }
    }

    /// Sample the sea under every pad and move it onto the surface.
    ///
    /// Height is written directly; orientation chases the surface normal at
    /// no more than 0.5 rad per second of frame time, so a wave crest rolls
    /// the deck instead of snapping it. The normal's components feed the
    /// Euler target directly, a small-angle shortcut that reads as tilt.
    pub fn ride_waves(
        &mut self,
        sea: &SeaState,
        clock: f32,
        dt: f32,
        physics: &mut PhysicsWorld,
    ) {
        let max_slew = 0.5 * dt;
        for pad in &mut self.pads {
            let sample = sea.evaluate(pad.rest_x, pad.rest_z, clock);
            pad.position.y = sample.offset.y;

            let n = sample.normal;
            let target = Quat::from_euler(EulerRot::XYZ, n.x, n.y, n.z);
            pad.orientation = rotate_towards(pad.orientation, target, max_slew);

            physics.set_pad_pose(pad.body, pad.position, pad.orientation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fleet_of(count: usize, seed: u64) -> (HelipadFleet, PhysicsWorld) {
        let params = PhysicsParams::default();
        let mut physics = PhysicsWorld::new(&params);
        let mut rng = StdRng::seed_from_u64(seed);
        let fleet = HelipadFleet::scatter(count, &mut rng, &mut physics, &params);
        (fleet, physics)
    }

    #[test]
    fn test_scatter_is_seeded_and_bounded() {
        let (a, _) = fleet_of(10, 7);
        let (b, _) = fleet_of(10, 7);
        assert_eq!(a.pads.len(), 10);

        for (pa, pb) in a.pads.iter().zip(&b.pads) {
            assert_eq!(pa.rest_x, pb.rest_x);
            assert_eq!(pa.rest_z, pb.rest_z);
            assert!(pa.rest_x.abs() <= 250.0);
            assert!(pa.rest_z.abs() <= 250.0);
        }
    }

    #[test]
    fn test_height_follows_the_wave_exactly() {
        let (mut fleet, mut physics) = fleet_of(3, 1);
        let sea = SeaState::default();

        fleet.ride_waves(&sea, 2.5, 1.0 / 60.0, &mut physics);

        for pad in &fleet.pads {
            let expected = sea.evaluate(pad.rest_x, pad.rest_z, 2.5).offset.y;
            assert_eq!(pad.position.y, expected);
            assert_eq!(pad.position.x, pad.rest_x);
            assert_eq!(pad.position.z, pad.rest_z);
        }
    }

    #[test]
    fn test_orientation_slew_is_bounded() {
        let (mut fleet, mut physics) = fleet_of(1, 3);
        let sea = SeaState::default();
        let dt = 1.0 / 60.0;

        let before = fleet.pads[0].orientation;
        fleet.ride_waves(&sea, 0.0, dt, &mut physics);
        let after = fleet.pads[0].orientation;

        assert!(before.angle_between(after) <= 0.5 * dt + 1e-5);
    }

    #[test]
    fn test_rotate_towards_clamps_then_converges() {
        let from = Quat::IDENTITY;
        let to = Quat::from_rotation_x(1.0);

        let stepped = rotate_towards(from, to, 0.25);
        assert_relative_eq!(from.angle_between(stepped), 0.25, epsilon = 1e-5);

        // Within range it lands exactly on the target.
        let mut q = from;
        for _ in 0..8 {
            q = rotate_towards(q, to, 0.25);
        }
        assert_relative_eq!(q.angle_between(to), 0.0, epsilon = 1e-6);
    }
}
