use bevy::reflect::Reflect;
use serde::{Deserialize, Serialize};

/// Foot contact signal of a node: vertical toe velocities and current toe heights.
#[derive(Reflect, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct ContactSignal {
    pub left_velocity: f32,
    pub right_velocity: f32,
    pub left_height: f32,
    pub right_height: f32,
}

impl ContactSignal {
    pub fn phase(&self) -> ContactPhase {
        ContactPhase::classify(self)
    }
}

impl From<[f32; 4]> for ContactSignal {
    fn from([left_velocity, right_velocity, left_height, right_height]: [f32; 4]) -> Self {
        Self {
            left_velocity,
            right_velocity,
            left_height,
            right_height,
        }
    }
}

impl From<ContactSignal> for [f32; 4] {
    fn from(value: ContactSignal) -> Self {
        [
            value.left_velocity,
            value.right_velocity,
            value.left_height,
            value.right_height,
        ]
    }
}

/// Support state of the feet, derived from the sign of the vertical toe velocities.
#[derive(Reflect, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    /// The feet move vertically in opposite directions.
    Transition,
    /// The left foot is rising.
    Rising,
    /// The left foot is falling or planted.
    Falling,
}

impl ContactPhase {
    pub fn classify(signal: &ContactSignal) -> Self {
        if signal.left_velocity * signal.right_velocity < 0. {
            ContactPhase::Transition
        } else if signal.left_velocity > 0. {
            ContactPhase::Rising
        } else {
            ContactPhase::Falling
        }
    }
}

/// Whether a transition from a node with contact `from` to one with contact `to` keeps the
/// foot motion continuous.
pub fn is_admissible(from: &ContactSignal, to: &ContactSignal) -> bool {
    match (from.phase(), to.phase()) {
        (ContactPhase::Transition, ContactPhase::Transition) => true,
        (ContactPhase::Rising, ContactPhase::Rising) => to.left_height > from.left_height,
        (ContactPhase::Falling, ContactPhase::Falling) => to.left_height < from.left_height,
        _ => false,
    }
}
