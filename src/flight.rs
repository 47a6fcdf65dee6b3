//! Helicopter control model: keys in, thrust vector and yaw rate out.
//!
//! Four axes run over one frame's control snapshot. Collective and cyclic
//! integrate into a persistent rotor-local thrust vector; pedals act on the
//! rotor body's yaw spin rate. All axes are rate-limited and hard-clamped,
//! so no key sequence and no frame hitch can push a value past its limit.

use glam::Vec3;

use crate::input::ControlsSnapshot;
use crate::params::FlightTuning;

/// Move `value` toward zero by `step` without crossing it.
fn relax_toward_zero(value: f32, step: f32) -> f32 {
    if value > 0.0 {
        (value - step).max(0.0)
    } else {
        (value + step).min(0.0)
    }
}

/// Pilot state carried across frames.
pub struct FlightControls {
    /// Rotor-local thrust (newtons): x banks, y lifts, z pitches.
    /// Applied at the rotor's center each frame, so tilting the vector
    /// drags the hull hanging below it.
    pub thrust: Vec3,
    tuning: FlightTuning,
}

impl FlightControls {
    pub fn new(tuning: FlightTuning) -> Self {
        Self {
            thrust: tuning.initial_thrust_n,
            tuning,
        }
    }

    /// Run all four axes for one frame.
    ///
    /// `altitude_m` is the hull's current height and `yaw_rate` the rotor
    /// body's current spin around +y; the updated spin rate is returned for
    /// the caller to write back to the body.
    ///
    /// Collective: W/S move lift at a fixed rate within [0, max]. With
    /// neither held above the hold altitude, lift snaps to the stable value
    /// that exactly carries the craft; below it the manual value persists
    /// so the pilot can settle onto a pad.
    pub fn update(
        &mut self,
        controls: &ControlsSnapshot,
        dt: f32,
        altitude_m: f32,
        yaw_rate: f32,
    ) -> f32 {
        let t = &self.tuning;
        let mut climbing = false;

        if controls.climb {
            self.thrust.y = (self.thrust.y + t.collective_rate_n_per_s * dt).min(t.collective_max_n);
            climbing = true;
        }
        if controls.descend {
            self.thrust.y = (self.thrust.y - t.collective_rate_n_per_s * dt).max(0.0);
            climbing = true;
        }
        if !climbing && altitude_m > t.hold_altitude_m {
            self.thrust.y = t.stable_lift_n;
        }

        let mut new_yaw_rate = yaw_rate;
        if controls.yaw_left {
            new_yaw_rate =
                (new_yaw_rate + t.pedal_accel_rad_per_s2 * dt).min(t.yaw_rate_max_rad_per_s);
        }
        if controls.yaw_right {
            new_yaw_rate =
                (new_yaw_rate - t.pedal_accel_rad_per_s2 * dt).max(-t.yaw_rate_max_rad_per_s);
        }
        if !controls.yaw_left && !controls.yaw_right {
            new_yaw_rate = relax_toward_zero(new_yaw_rate, t.pedal_relax_rad_per_s2 * dt);
        }

        if controls.pitch_forward {
            self.thrust.z = (self.thrust.z - t.cyclic_rate_n_per_s * dt).max(-t.cyclic_max_n);
        }
        if controls.pitch_back {
            self.thrust.z = (self.thrust.z + t.cyclic_rate_n_per_s * dt).min(t.cyclic_max_n);
        }
        if !controls.pitch_forward && !controls.pitch_back {
            self.thrust.z = relax_toward_zero(self.thrust.z, t.cyclic_relax_n_per_s * dt);
        }

        if controls.bank_left {
            self.thrust.x = (self.thrust.x - t.cyclic_rate_n_per_s * dt).max(-t.cyclic_max_n);
        }
        if controls.bank_right {
            self.thrust.x = (self.thrust.x + t.cyclic_rate_n_per_s * dt).min(t.cyclic_max_n);
        }
        if !controls.bank_left && !controls.bank_right {
            self.thrust.x = relax_toward_zero(self.thrust.x, t.cyclic_relax_n_per_s * dt);
        }

        new_yaw_rate
    }
}
