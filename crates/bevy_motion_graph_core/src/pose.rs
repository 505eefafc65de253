use bevy::{
    math::{Quat, Vec3},
    reflect::Reflect,
};
use serde::{Deserialize, Serialize};

/// Index of the root joint. Its rotation doubles as the root orientation.
pub const ROOT_JOINT: usize = 0;

const POSITION_SLOTS: usize = 3;
const ROTATION_SLOTS: usize = 4;

/// Flat layout shared by poses and velocities: root position in `[0, 3)`, followed by one
/// `[x, y, z, w]` quaternion per joint.
#[derive(Reflect, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoseLayout {
    joint_count: usize,
}

impl PoseLayout {
    pub fn new(joint_count: usize) -> Self {
        Self { joint_count }
    }

    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    /// Number of scalars in one pose vector.
    pub fn len(&self) -> usize {
        POSITION_SLOTS + ROTATION_SLOTS * self.joint_count
    }

    pub fn is_empty(&self) -> bool {
        self.joint_count == 0
    }

    pub fn rotation_offset(&self, joint: usize) -> usize {
        POSITION_SLOTS + ROTATION_SLOTS * joint
    }

    pub fn position(&self, values: &[f32]) -> Vec3 {
        Vec3::from_slice(&values[..POSITION_SLOTS])
    }

    pub fn set_position(&self, values: &mut [f32], position: Vec3) {
        position.write_to_slice(&mut values[..POSITION_SLOTS]);
    }

    pub fn rotation(&self, values: &[f32], joint: usize) -> Quat {
        let offset = self.rotation_offset(joint);
        Quat::from_slice(&values[offset..offset + ROTATION_SLOTS])
    }

    pub fn set_rotation(&self, values: &mut [f32], joint: usize, rotation: Quat) {
        let offset = self.rotation_offset(joint);
        rotation.write_to_slice(&mut values[offset..offset + ROTATION_SLOTS]);
    }
}

/// Absolute-space pose produced by a traversal tick: the integrated root position and
/// orientation together with the joint rotations of the node that was reached.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesizedPose {
    pub frame_id: usize,
    layout: PoseLayout,
    values: Vec<f32>,
}

impl SynthesizedPose {
    pub(crate) fn new(
        frame_id: usize,
        layout: PoseLayout,
        node_pose: &[f32],
        position: Vec3,
        orientation: Quat,
    ) -> Self {
        let mut values = node_pose.to_vec();
        layout.set_position(&mut values, position);
        layout.set_rotation(&mut values, ROOT_JOINT, orientation);
        Self {
            frame_id,
            layout,
            values,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.layout.position(&self.values)
    }

    pub fn root_orientation(&self) -> Quat {
        self.layout.rotation(&self.values, ROOT_JOINT)
    }

    pub fn joint_rotation(&self, joint: usize) -> Quat {
        self.layout.rotation(&self.values, joint)
    }

    pub fn layout(&self) -> PoseLayout {
        self.layout
    }

    /// The pose in the same flat layout as the input clips.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}
