//! Control inputs and the control mode selected when a car is created.

use serde::{Deserialize, Serialize};

/// Who drives a car. Fixed for the car's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlType {
    /// Driven by external key events; the brain still runs for display.
    Keys,
    /// Traffic: always accelerates, no sensor and no brain.
    Dummy,
    /// Driven by its brain.
    Ai,
}

/// Arrow keys understood by [`Controls::press`] and [`Controls::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Accelerate.
    Up,
    /// Brake and reverse.
    Down,
    /// Steer left.
    Left,
    /// Steer right.
    Right,
}

/// The four control inputs of a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controls {
    /// Accelerate.
    pub forward: bool,
    /// Steer left.
    pub left: bool,
    /// Steer right.
    pub right: bool,
    /// Brake and reverse.
    pub reverse: bool,
}

impl Controls {
    /// Initial controls for a control mode. Dummy cars start (and stay)
    /// accelerating.
    pub fn new(control_type: ControlType) -> Self {
        Self {
            forward: control_type == ControlType::Dummy,
            ..Self::default()
        }
    }

    /// Sets the controls from brain outputs ordered
    /// `[forward, left, right, reverse]`; an output drives its control when
    /// it fired (`1.0`).
    pub fn from_outputs(outputs: &[f64]) -> Self {
        let fired = |i: usize| outputs.get(i).is_some_and(|&v| v >= 1.0);
        Self {
            forward: fired(0),
            left: fired(1),
            right: fired(2),
            reverse: fired(3),
        }
    }

    /// Handles a key-down event.
    pub fn press(&mut self, key: Key) {
        *self.slot(key) = true;
    }

    /// Handles a key-up event.
    pub fn release(&mut self, key: Key) {
        *self.slot(key) = false;
    }

    fn slot(&mut self, key: Key) -> &mut bool {
        match key {
            Key::Up => &mut self.forward,
            Key::Down => &mut self.reverse,
            Key::Left => &mut self.left,
            Key::Right => &mut self.right,
        }
    }
}
