use bevy::{
    math::{Quat, Vec3},
    reflect::{Reflect, std_traits::ReflectDefault},
};
use serde::{Deserialize, Serialize};

use crate::errors::{ConstructionError, ConstructionResult};

/// One of the three world axes.
#[derive(Reflect, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[reflect(Default)]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// Coordinate of `v` along this axis.
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// `v` with its coordinate along this axis set to zero.
    pub fn flatten(self, v: Vec3) -> Vec3 {
        v - self.unit() * self.component(v)
    }
}

/// Tunables for motion graph construction and traversal.
///
/// Usually written as RON:
/// ```ron
/// (
///     similarity_threshold: 0.05,
///     velocity_weight: 0.5,
///     left_toe: "LeftToe",
///     right_toe: "RightToe",
/// )
/// ```
/// Omitted fields take their default value.
#[derive(Reflect, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[reflect(Default)]
#[serde(default)]
pub struct MotionGraphConfig {
    /// Non-backbone edges are kept only when the combined distance is strictly below this.
    pub similarity_threshold: f32,
    /// Weight of the velocity distance in the combined distance.
    pub velocity_weight: f32,
    /// A sampled successor less than this many frames behind the current node triggers a
    /// resample.
    pub backward_loop_window: usize,
    /// Playback speed multipliers are clamped to at least this value.
    pub min_playback_speed: f32,
    /// Upper bound on the graph transitions a single tick may take, whatever the speed.
    pub max_steps_per_tick: usize,
    pub up_axis: Axis,
    /// Axis that points forward in the canonical root orientation.
    pub forward_axis: Axis,
    pub left_toe: String,
    pub right_toe: String,
    pub canonical_position: [f32; 3],
    /// Quaternion in `[x, y, z, w]` order.
    pub canonical_orientation: [f32; 4],
    /// Source rows evaluated per parallel batch when building candidate edges.
    pub pair_block_size: usize,
}

impl Default for MotionGraphConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.05,
            velocity_weight: 0.5,
            backward_loop_window: 10,
            min_playback_speed: 1.,
            max_steps_per_tick: 8,
            up_axis: Axis::Y,
            forward_axis: Axis::Z,
            left_toe: "LeftToe".into(),
            right_toe: "RightToe".into(),
            canonical_position: [0., 0., 0.],
            canonical_orientation: [0., 0., 0., 1.],
            pair_block_size: 64,
        }
    }
}

impl MotionGraphConfig {
    pub fn from_ron(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(source)
    }

    pub fn canonical_position(&self) -> Vec3 {
        Vec3::from_array(self.canonical_position)
    }

    pub fn canonical_orientation(&self) -> Quat {
        Quat::from_array(self.canonical_orientation).normalize()
    }

    pub fn validate(&self) -> ConstructionResult<()> {
        if !self.similarity_threshold.is_finite() || self.similarity_threshold <= 0. {
            return Err(ConstructionError::InvalidConfig(format!(
                "similarity_threshold must be positive, got {}",
                self.similarity_threshold
            )));
        }
        if !self.velocity_weight.is_finite() || self.velocity_weight < 0. {
            return Err(ConstructionError::InvalidConfig(format!(
                "velocity_weight must be non-negative, got {}",
                self.velocity_weight
            )));
        }
        if !self.min_playback_speed.is_finite() || self.min_playback_speed < 1. {
            return Err(ConstructionError::InvalidConfig(format!(
                "min_playback_speed must be at least 1, got {}",
                self.min_playback_speed
            )));
        }
        if (self.max_steps_per_tick as f32) < self.min_playback_speed.floor() {
            return Err(ConstructionError::InvalidConfig(format!(
                "max_steps_per_tick must cover min_playback_speed, got {} < {}",
                self.max_steps_per_tick, self.min_playback_speed
            )));
        }
        if self.up_axis == self.forward_axis {
            return Err(ConstructionError::InvalidConfig(
                "up_axis and forward_axis must differ".into(),
            ));
        }
        if self.pair_block_size == 0 {
            return Err(ConstructionError::InvalidConfig(
                "pair_block_size must be at least 1".into(),
            ));
        }
        let orientation = Quat::from_array(self.canonical_orientation);
        if !orientation.is_finite() || orientation.length_squared() < f32::EPSILON {
            return Err(ConstructionError::InvalidConfig(
                "canonical_orientation must be a non-zero quaternion".into(),
            ));
        }
        Ok(())
    }
}
