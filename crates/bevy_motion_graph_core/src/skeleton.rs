use bevy::{
    math::{Quat, Vec3},
    platform::collections::HashMap,
};
use std::fmt::Debug;

use crate::{
    errors::{ConstructionError, ConstructionResult},
    pose::{PoseLayout, ROOT_JOINT},
};

/// What the graph builder needs to know about the skeleton the clips were captured on.
pub trait SkeletonLike: Send + Sync {
    fn joint_count(&self) -> usize;

    /// Index of the joint with the given name, if any.
    fn joint_index(&self, name: &str) -> Option<usize>;

    /// Seconds between two consecutive captured frames.
    fn frame_time(&self) -> f32;

    /// World-space position of `joint` for a pose vector laid out per [`SkeletonLike::layout`].
    fn global_position(&self, pose: &[f32], joint: usize) -> Vec3;

    fn layout(&self) -> PoseLayout {
        PoseLayout::new(self.joint_count())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Joint {
    pub name: String,
    pub parent: Option<usize>,
    /// Rest translation relative to the parent joint.
    pub offset: Vec3,
}

impl Joint {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            offset: Vec3::ZERO,
        }
    }

    pub fn child(name: impl Into<String>, parent: usize, offset: Vec3) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            offset,
        }
    }
}

/// Hierarchical skeleton with joints stored parents-first, as in BVH files.
#[derive(Clone)]
pub struct MotionSkeleton {
    joints: Vec<Joint>,
    name_to_index: HashMap<String, usize>,
    frame_time: f32,
}

impl MotionSkeleton {
    pub fn new(joints: Vec<Joint>, frame_time: f32) -> ConstructionResult<Self> {
        if joints.is_empty() {
            return Err(ConstructionError::InvalidSkeleton(
                "a skeleton needs at least one joint".into(),
            ));
        }
        if !frame_time.is_finite() || frame_time <= 0. {
            return Err(ConstructionError::InvalidSkeleton(format!(
                "frame time must be positive, got {frame_time}"
            )));
        }

        let mut name_to_index = HashMap::default();
        for (index, joint) in joints.iter().enumerate() {
            match (index, joint.parent) {
                (ROOT_JOINT, None) => {}
                (ROOT_JOINT, Some(_)) => {
                    return Err(ConstructionError::InvalidSkeleton(
                        "the first joint must be the root".into(),
                    ));
                }
                (_, None) => {
                    return Err(ConstructionError::InvalidSkeleton(format!(
                        "joint {:?} has no parent, only the first joint may be a root",
                        joint.name
                    )));
                }
                (_, Some(parent)) if parent >= index => {
                    return Err(ConstructionError::InvalidSkeleton(format!(
                        "joint {:?} is listed before its parent",
                        joint.name
                    )));
                }
                _ => {}
            }
            if name_to_index.insert(joint.name.clone(), index).is_some() {
                return Err(ConstructionError::InvalidSkeleton(format!(
                    "duplicate joint name {:?}",
                    joint.name
                )));
            }
        }

        Ok(Self {
            joints,
            name_to_index,
            frame_time,
        })
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn parent(&self, joint: usize) -> Option<usize> {
        self.joints.get(joint).and_then(|j| j.parent)
    }

    fn global_transform(&self, layout: &PoseLayout, pose: &[f32], joint: usize) -> (Vec3, Quat) {
        let local_rotation = layout.rotation(pose, joint);
        let offset = self.joints[joint].offset;
        match self.joints[joint].parent {
            None => (layout.position(pose) + offset, local_rotation),
            Some(parent) => {
                let (parent_position, parent_rotation) =
                    self.global_transform(layout, pose, parent);
                (
                    parent_position + parent_rotation * offset,
                    parent_rotation * local_rotation,
                )
            }
        }
    }

    fn indent(f: &mut std::fmt::Formatter<'_>, level: u32) -> std::fmt::Result {
        if level == 0 {
            return Ok(());
        }
        for _ in 0..(level - 1) {
            write!(f, "┃ ")?;
        }
        write!(f, "┣━")?;
        Ok(())
    }

    fn fmt_level(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        level: u32,
        parent: usize,
    ) -> std::fmt::Result {
        for (index, joint) in self.joints.iter().enumerate() {
            if joint.parent != Some(parent) {
                continue;
            }
            Self::indent(f, level)?;
            writeln!(f, "🦴 {:?} [{}]", joint.name, index)?;
            self.fmt_level(f, level + 1, index)?;
        }
        Ok(())
    }
}

impl SkeletonLike for MotionSkeleton {
    fn joint_count(&self) -> usize {
        self.joints.len()
    }

    fn joint_index(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    fn frame_time(&self) -> f32 {
        self.frame_time
    }

    fn global_position(&self, pose: &[f32], joint: usize) -> Vec3 {
        self.global_transform(&self.layout(), pose, joint).0
    }
}

impl Debug for MotionSkeleton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Skeleton hierarchy:")?;
        writeln!(f, "🦴 {:?} [{}]", self.joints[ROOT_JOINT].name, ROOT_JOINT)?;
        self.fmt_level(f, 1, ROOT_JOINT)
    }
}
