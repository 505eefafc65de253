use bevy::math::{Quat, Vec3};

use crate::{
    config::MotionGraphConfig,
    node_table::NodeRef,
    pose::{PoseLayout, ROOT_JOINT},
};

/// Steering inputs smaller than this leave the heading untouched.
const TURN_EPSILON: f32 = 1e-6;

/// Absolute root placement accumulated by a walk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootState {
    pub position: Vec3,
    pub orientation: Quat,
    /// Horizontal unit vector of travel.
    pub direction: Vec3,
}

impl RootState {
    /// Root placement stored in a node's (canonical) pose.
    pub fn from_pose(config: &MotionGraphConfig, layout: &PoseLayout, pose: &[f32]) -> Self {
        let orientation = layout.rotation(pose, ROOT_JOINT);
        Self {
            position: layout.position(pose),
            orientation,
            direction: travel_direction(config, orientation, config.forward_axis.unit()),
        }
    }

    /// Root facing `heading` radians of yaw away from the canonical orientation.
    pub fn facing(config: &MotionGraphConfig, position: Vec3, heading: f32) -> Self {
        let yaw = Quat::from_axis_angle(config.up_axis.unit(), heading);
        let orientation = (yaw * config.canonical_orientation()).normalize();
        Self {
            position,
            orientation,
            direction: travel_direction(config, orientation, config.forward_axis.unit()),
        }
    }

    /// Moves the root along one transition into `node`, turning by `turn` radians of yaw
    /// first when `turn` is not negligible.
    pub fn advance(
        &mut self,
        config: &MotionGraphConfig,
        layout: &PoseLayout,
        node: &NodeRef,
        turn: f32,
    ) {
        if turn.abs() > TURN_EPSILON {
            let yaw = Quat::from_axis_angle(config.up_axis.unit(), turn);
            let root_delta = layout.rotation(node.velocity, ROOT_JOINT);
            self.orientation = (yaw * self.orientation * root_delta).normalize();
            self.direction = travel_direction(config, self.orientation, self.direction);
        }
        self.position += root_speed(config, layout, node) * self.direction;
    }

    /// Moves the root along one transition into `node` without touching its heading.
    pub fn translate(&mut self, config: &MotionGraphConfig, layout: &PoseLayout, node: &NodeRef) {
        self.position += root_speed(config, layout, node) * self.direction;
    }
}

/// Horizontal distance the root covered while entering `node`.
pub fn root_speed(config: &MotionGraphConfig, layout: &PoseLayout, node: &NodeRef) -> f32 {
    config
        .up_axis
        .flatten(layout.position(node.velocity))
        .length()
}

fn travel_direction(config: &MotionGraphConfig, orientation: Quat, fallback: Vec3) -> Vec3 {
    config
        .up_axis
        .flatten(orientation * config.forward_axis.unit())
        .try_normalize()
        .unwrap_or(fallback)
}
