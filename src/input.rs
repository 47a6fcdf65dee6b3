//! Keyboard state sampled once per frame.
//!
//! Raw winit key events are translated into logical flight controls the
//! moment they arrive; the simulation never sees key codes. Controls are
//! level-triggered: each frame reads whatever is held at sample time, so a
//! press and release that both land between two frames cancel out and are
//! dropped. Events and frames interleave on the single winit event-loop
//! thread, which is why there is no lock here.

use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Logical flight controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Climb,
    Descend,
    YawLeft,
    YawRight,
    PitchForward,
    PitchBack,
    BankLeft,
    BankRight,
}

impl Control {
    /// Keyboard layout: WASD for collective and pedals, arrow keys or the
    /// numpad for cyclic.
    pub fn from_key(key: KeyCode) -> Option<Self> {
        Some(match key {
            KeyCode::KeyW => Control::Climb,
            KeyCode::KeyS => Control::Descend,
            KeyCode::KeyA => Control::YawLeft,
            KeyCode::KeyD => Control::YawRight,
            KeyCode::ArrowUp | KeyCode::Numpad8 => Control::PitchForward,
            KeyCode::ArrowDown | KeyCode::Numpad5 => Control::PitchBack,
            KeyCode::ArrowLeft | KeyCode::Numpad4 => Control::BankLeft,
            KeyCode::ArrowRight | KeyCode::Numpad6 => Control::BankRight,
            _ => return None,
        })
    }
}

/// Controls currently held down, mutated by key events as they arrive.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Control>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, control: Control) {
        self.held.insert(control);
    }

    pub fn release(&mut self, control: Control) {
        self.held.remove(&control);
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.held.contains(&control)
    }

    /// Freeze the current state for one frame of simulation.
    pub fn snapshot(&self) -> ControlsSnapshot {
        ControlsSnapshot {
            climb: self.is_held(Control::Climb),
            descend: self.is_held(Control::Descend),
            yaw_left: self.is_held(Control::YawLeft),
            yaw_right: self.is_held(Control::YawRight),
            pitch_forward: self.is_held(Control::PitchForward),
            pitch_back: self.is_held(Control::PitchBack),
            bank_left: self.is_held(Control::BankLeft),
            bank_right: self.is_held(Control::BankRight),
        }
    }
}

/// One frame's worth of control state, as plain flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlsSnapshot {
    pub climb: bool,
    pub descend: bool,
    pub yaw_left: bool,
    pub yaw_right: bool,
    pub pitch_forward: bool,
    pub pitch_back: bool,
    pub bank_left: bool,
    pub bank_right: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut input = InputState::new();
        assert!(!input.is_held(Control::Climb));

        input.press(Control::Climb);
        assert!(input.is_held(Control::Climb));

        input.release(Control::Climb);
        assert!(!input.is_held(Control::Climb));
    }

    #[test]
    fn test_snapshot_reflects_held_controls() {
        let mut input = InputState::new();
        input.press(Control::Climb);
        input.press(Control::BankLeft);

        let snap = input.snapshot();
        assert!(snap.climb);
        assert!(snap.bank_left);
        assert!(!snap.descend);
        assert!(!snap.yaw_right);
    }

    #[test]
    fn test_press_release_between_snapshots_is_dropped() {
        let mut input = InputState::new();
        input.press(Control::Descend);
        input.release(Control::Descend);
        // Level-triggered: nothing held at sample time means nothing seen.
        assert!(!input.snapshot().descend);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Control::from_key(KeyCode::KeyW), Some(Control::Climb));
        assert_eq!(Control::from_key(KeyCode::KeyA), Some(Control::YawLeft));
        assert_eq!(
            Control::from_key(KeyCode::ArrowUp),
            Some(Control::PitchForward)
        );
        assert_eq!(
            Control::from_key(KeyCode::Numpad8),
            Some(Control::PitchForward)
        );
        assert_eq!(
            Control::from_key(KeyCode::Numpad6),
            Some(Control::BankRight)
        );
        assert_eq!(Control::from_key(KeyCode::Space), None);
    }
}
