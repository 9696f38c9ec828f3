//! Per-tick input snapshot
//!
//! Device mapping lives outside the simulation. Each action is reduced to
//! two bits: whether it is held, and whether it became held this tick.

use serde::{Deserialize, Serialize};

/// State of one action for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState {
    pub held: bool,
    /// Rising edge: held now, not held last tick
    pub pressed: bool,
}

impl ButtonState {
    pub const RELEASED: ButtonState = ButtonState {
        held: false,
        pressed: false,
    };

    /// First tick of a press
    pub const PRESSED: ButtonState = ButtonState {
        held: true,
        pressed: true,
    };

    /// Any later tick of a press
    pub const HELD: ButtonState = ButtonState {
        held: true,
        pressed: false,
    };
}

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub accelerate: ButtonState,
    pub brake: ButtonState,
    pub climb: ButtonState,
    pub dive: ButtonState,
    /// Next formation (spread out)
    pub shape_up: ButtonState,
    /// Previous formation (pull in)
    pub shape_down: ButtonState,
}

/// Raw "is down" samples for each action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldActions {
    pub accelerate: bool,
    pub brake: bool,
    pub climb: bool,
    pub dive: bool,
    pub shape_up: bool,
    pub shape_down: bool,
}

/// Derives rising edges from successive held samples
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    last: HeldActions,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample once per tick
    pub fn sync(&mut self, now: HeldActions) -> TickInput {
        let edge = |held: bool, was: bool| ButtonState {
            held,
            pressed: held && !was,
        };
        let last = self.last;
        self.last = now;
        TickInput {
            accelerate: edge(now.accelerate, last.accelerate),
            brake: edge(now.brake, last.brake),
            climb: edge(now.climb, last.climb),
            dive: edge(now.dive, last.dive),
            shape_up: edge(now.shape_up, last.shape_up),
            shape_down: edge(now.shape_down, last.shape_down),
        }
    }
}
