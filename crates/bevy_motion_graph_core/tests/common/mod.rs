#![allow(dead_code)]

use bevy::math::{Quat, Vec3};
use bevy_motion_graph_core::{
    config::MotionGraphConfig,
    extraction::MotionClip,
    motion_graph::MotionGraph,
    pose::ROOT_JOINT,
    skeleton::{Joint, MotionSkeleton, SkeletonLike},
};
use std::f32::consts::TAU;

pub const FRAME_TIME: f32 = 1. / 30.;

/// Frames per stride of the synthetic walk.
pub const STRIDE: usize = 10;

/// Distance the root covers per captured frame.
pub const STEP: f32 = 0.05;

pub fn walker() -> MotionSkeleton {
    MotionSkeleton::new(
        vec![
            Joint::root("Hips"),
            Joint::child("LeftUpLeg", 0, Vec3::new(0.1, -0.9, 0.)),
            Joint::child("RightUpLeg", 0, Vec3::new(-0.1, -0.9, 0.)),
            Joint::child("LeftToe", 1, Vec3::new(0., 0., 0.3)),
            Joint::child("RightToe", 2, Vec3::new(0., 0., 0.3)),
        ],
        FRAME_TIME,
    )
    .unwrap()
}

/// Hip swing of a frame. Legs swing in opposition, so one toe always rises while the other
/// falls and every node ends up in the transition contact phase.
pub fn swing(frame: usize) -> f32 {
    let stride_phase = TAU * (frame % STRIDE) as f32 / STRIDE as f32;
    0.3 * (stride_phase + 0.1).sin()
}

/// A straight walk along +Z whose stride repeats every [`STRIDE`] frames.
pub fn walking_clip(skeleton: &MotionSkeleton, frames: usize) -> MotionClip {
    let layout = skeleton.layout();
    let frames = (0..frames)
        .map(|frame| {
            let mut values = vec![0.; layout.len()];
            layout.set_position(&mut values, Vec3::new(0., 1., STEP * frame as f32));
            for joint in 0..layout.joint_count() {
                layout.set_rotation(&mut values, joint, Quat::IDENTITY);
            }
            layout.set_rotation(&mut values, ROOT_JOINT, Quat::from_rotation_y(0.3));
            layout.set_rotation(&mut values, 1, Quat::from_rotation_x(swing(frame)));
            layout.set_rotation(&mut values, 2, Quat::from_rotation_x(-swing(frame)));
            values
        })
        .collect();
    MotionClip::new(frames)
}

pub fn two_clip_graph(config: MotionGraphConfig) -> MotionGraph {
    let skeleton = walker();
    let clips = [walking_clip(&skeleton, 50), walking_clip(&skeleton, 50)];
    MotionGraph::build(&skeleton, &clips, config).unwrap()
}
