//! Rigid body world: the helicopter assembly, floating pads, and stepping.
//!
//! Everything rapier lives behind this module; callers speak glam. The
//! helicopter is a hull and a rotor pinned together by a ball joint, both
//! dynamic. Helipads are kinematic position-based bodies: the wave field
//! decides where they are and the solver treats them as unstoppable, which
//! is exactly how a landing deck should feel to the hull resting on it.

use glam::{Quat, Vec3};
use log::warn;
use rapier3d::na;
use rapier3d::prelude::*;

use crate::params::PhysicsParams;

pub(crate) fn na_to_vec3(v: &na::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub(crate) fn na_to_quat(q: &na::UnitQuaternion<f32>) -> Quat {
    let c = q.quaternion().coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

pub(crate) fn quat_to_na(q: Quat) -> na::UnitQuaternion<f32> {
    na::UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
}

fn pose_is_finite(iso: &na::Isometry3<f32>) -> bool {
    iso.translation.vector.iter().all(|v| v.is_finite())
        && iso.rotation.coords.iter().all(|v| v.is_finite())
}

/// The physics world plus handles to the two helicopter bodies.
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    gravity: na::Vector3<f32>,
    params: PhysicsParams,

    hull: RigidBodyHandle,
    rotor: RigidBodyHandle,
    last_good_hull: na::Isometry3<f32>,
    last_good_rotor: na::Isometry3<f32>,
}

impl PhysicsWorld {
    /// Build the world with the helicopter assembly already in it.
    pub fn new(params: &PhysicsParams) -> Self {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut impulse_joints = ImpulseJointSet::new();

        let spawn = params.hull_spawn;
        let hull = bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(vector![spawn.x, spawn.y, spawn.z])
                .angular_damping(params.hull_angular_damping)
                .can_sleep(false)
                .build(),
        );
        let he = params.hull_half_extents;
        colliders.insert_with_parent(
            ColliderBuilder::cuboid(he.x, he.y, he.z)
                .mass(params.hull_mass_kg)
                .build(),
            hull,
            &mut bodies,
        );

        // Rotor spawns already seated on its anchor so the joint starts
        // with zero correction to solve.
        let anchor = params.rotor_anchor;
        let rotor = bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(vector![
                    spawn.x + anchor.x,
                    spawn.y + anchor.y,
                    spawn.z + anchor.z
                ])
                .linear_damping(params.rotor_linear_damping)
                .can_sleep(false)
                .build(),
        );
        colliders.insert_with_parent(
            ColliderBuilder::ball(params.rotor_radius_m)
                .mass(params.rotor_mass_kg)
                .build(),
            rotor,
            &mut bodies,
        );

        let joint = SphericalJointBuilder::new()
            .local_anchor1(point![anchor.x, anchor.y, anchor.z])
            .local_anchor2(point![0.0, 0.0, 0.0])
            .contacts_enabled(false);
        impulse_joints.insert(hull, rotor, joint, true);

        let last_good_hull = *bodies[hull].position();
        let last_good_rotor = *bodies[rotor].position();

        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            impulse_joints,
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            gravity: vector![0.0, params.gravity_y, 0.0],
            params: params.clone(),
            hull,
            rotor,
            last_good_hull,
            last_good_rotor,
        }
    }

    /// Add a kinematic helipad body at (x, pad_spawn_height, z).
    pub fn add_helipad(&mut self, x: f32, z: f32) -> RigidBodyHandle {
        let handle = self.bodies.insert(
            RigidBodyBuilder::kinematic_position_based()
                .translation(vector![x, self.params.pad_spawn_height_m, z])
                .build(),
        );
        let he = self.params.pad_half_extents;
        self.colliders.insert_with_parent(
            ColliderBuilder::cuboid(he.x, he.y, he.z).build(),
            handle,
            &mut self.bodies,
        );
        handle
    }

    /// Advance the world by min(delta, max_step_dt) seconds; returns the dt
    /// actually integrated. Clamping here means a stalled frame (window
    /// drag, debugger pause) cannot feed the solver a multi-second step.
    pub fn step(&mut self, delta: f32) -> f32 {
        let dt = delta.min(self.params.max_step_dt_s);
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.sanitize();
        dt
    }

    /// Catch solver blowups: a non-finite pose is rolled back to the last
    /// finite one and the body's velocities are zeroed.
    fn sanitize(&mut self) {
        for (handle, last_good) in [
            (self.hull, &mut self.last_good_hull),
            (self.rotor, &mut self.last_good_rotor),
        ] {
            let body = &mut self.bodies[handle];
            if pose_is_finite(body.position()) {
                *last_good = *body.position();
            } else {
                warn!("non-finite pose on body {handle:?}; restoring last good pose");
                body.set_position(*last_good, true);
                body.set_linvel(na::Vector3::zeros(), true);
                body.set_angvel(na::Vector3::zeros(), true);
            }
        }
    }

    pub fn hull_pose(&self) -> (Vec3, Quat) {
        let iso = self.bodies[self.hull].position();
        (na_to_vec3(&iso.translation.vector), na_to_quat(&iso.rotation))
    }

    pub fn rotor_pose(&self) -> (Vec3, Quat) {
        let iso = self.bodies[self.rotor].position();
        (na_to_vec3(&iso.translation.vector), na_to_quat(&iso.rotation))
    }

    /// Rotor spin rate around +y (rad/s).
    pub fn rotor_yaw_rate(&self) -> f32 {
        self.bodies[self.rotor].angvel().y
    }

    /// Write the rotor's yaw spin, leaving the other axes alone.
    pub fn set_rotor_yaw_rate(&mut self, rate: f32) {
        let body = &mut self.bodies[self.rotor];
        let mut angvel = *body.angvel();
        angvel.y = rate;
        body.set_angvel(angvel, true);
    }

    /// Copy the rotor's yaw spin onto the hull so the fuselage turns with
    /// the rotor instead of counter-rotating under it.
    pub fn slave_hull_yaw_to_rotor(&mut self) {
        let rate = self.bodies[self.rotor].angvel().y;
        let body = &mut self.bodies[self.hull];
        let mut angvel = *body.angvel();
        angvel.y = rate;
        body.set_angvel(angvel, true);
    }

    /// Apply this frame's thrust in the rotor's local frame. Replaces any
    /// force left over from the previous frame, so the force acts for
    /// exactly one step.
    pub fn apply_rotor_thrust(&mut self, local_thrust: Vec3) {
        let body = &mut self.bodies[self.rotor];
        let world = body.position().rotation
            * na::Vector3::new(local_thrust.x, local_thrust.y, local_thrust.z);
        body.reset_forces(true);
        body.add_force(world, true);
    }

    /// Drive a helipad's kinematic body toward the wave-derived pose. The
    /// solver moves it there during the next step.
    pub fn set_pad_pose(&mut self, handle: RigidBodyHandle, position: Vec3, rotation: Quat) {
        let iso = na::Isometry3::from_parts(
            na::Translation3::new(position.x, position.y, position.z),
            quat_to_na(rotation),
        );
        self.bodies[handle].set_next_kinematic_position(iso);
    }

    pub fn pad_pose(&self, handle: RigidBodyHandle) -> (Vec3, Quat) {
        let iso = self.bodies[handle].position();
        (na_to_vec3(&iso.translation.vector), na_to_quat(&iso.rotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(&PhysicsParams::default())
    }

    #[test]
    fn test_step_clamps_delta() {
        let mut world = world();
        assert_relative_eq!(world.step(10.0), 0.1);
        assert_relative_eq!(world.step(DT), DT);
    }

    #[test]
    fn test_assembly_spawns_seated() {
        let world = world();
        let (hull_pos, _) = world.hull_pose();
        let (rotor_pos, _) = world.rotor_pose();
        assert_relative_eq!(hull_pos.y, 2.0);
        assert_relative_eq!(rotor_pos.y, 3.0);
        assert_relative_eq!((rotor_pos - hull_pos).length(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_hull_falls_without_thrust() {
        let mut world = world();
        for _ in 0..30 {
            world.step(DT);
        }
        let (pos, _) = world.hull_pose();
        assert!(pos.y < 2.0, "hull should fall, at y = {}", pos.y);
    }

    #[test]
    fn test_stable_lift_roughly_hovers() {
        let mut world = world();
        for _ in 0..60 {
            world.apply_rotor_thrust(Vec3::new(0.0, 14.7, 0.0));
            world.step(DT);
        }
        let (pos, _) = world.hull_pose();
        // 14.7 N against 1.5 kg under 9.82 m/s²: a slow sag, not a drop.
        assert!((pos.y - 2.0).abs() < 0.5, "hull drifted to y = {}", pos.y);
    }

    #[test]
    fn test_yaw_rate_roundtrip_and_slaving() {
        let mut world = world();
        world.set_rotor_yaw_rate(1.5);
        assert_relative_eq!(world.rotor_yaw_rate(), 1.5);

        world.slave_hull_yaw_to_rotor();
        let hull_angvel_y = world.bodies[world.hull].angvel().y;
        assert_relative_eq!(hull_angvel_y, 1.5);
    }

    #[test]
    fn test_kinematic_pad_reaches_target_pose() {
        let mut world = world();
        let pad = world.add_helipad(10.0, -10.0);

        let target = Vec3::new(10.0, 0.25, -10.0);
        world.set_pad_pose(pad, target, Quat::IDENTITY);
        world.step(DT);

        let (pos, _) = world.pad_pose(pad);
        assert_relative_eq!(pos.x, target.x, epsilon = 1e-4);
        assert_relative_eq!(pos.y, target.y, epsilon = 1e-4);
        assert_relative_eq!(pos.z, target.z, epsilon = 1e-4);
    }

    #[test]
    fn test_pose_finiteness_check() {
        let finite = na::Isometry3::translation(1.0, 2.0, 3.0);
        assert!(pose_is_finite(&finite));

        let broken = na::Isometry3::translation(f32::NAN, 2.0, 3.0);
        assert!(!pose_is_finite(&broken));
    }

    #[test]
    fn test_quat_conversion_roundtrip() {
        let q = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3);
        let back = na_to_quat(&quat_to_na(q));
        assert_relative_eq!(q.x, back.x, epsilon = 1e-6);
        assert_relative_eq!(q.y, back.y, epsilon = 1e-6);
        assert_relative_eq!(q.z, back.z, epsilon = 1e-6);
        assert_relative_eq!(q.w, back.w, epsilon = 1e-6);
    }
}
