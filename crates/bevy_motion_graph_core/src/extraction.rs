use bevy::log::debug;

use crate::{
    config::MotionGraphConfig,
    contact::ContactSignal,
    errors::{ConstructionError, ConstructionResult},
    node_table::NodeTable,
    pose::{PoseLayout, ROOT_JOINT},
    skeleton::SkeletonLike,
};

/// One captured clip: a sequence of pose vectors in the skeleton's [`PoseLayout`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MotionClip {
    pub frames: Vec<Vec<f32>>,
}

impl MotionClip {
    pub fn new(frames: Vec<Vec<f32>>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl From<Vec<Vec<f32>>> for MotionClip {
    fn from(frames: Vec<Vec<f32>>) -> Self {
        Self::new(frames)
    }
}

/// Finite-difference velocity from `prev` to `current`: position delta followed by
/// `inverse(prev) * current` for every joint.
pub fn frame_velocity(layout: &PoseLayout, prev: &[f32], current: &[f32]) -> Vec<f32> {
    let mut velocity = vec![0.; layout.len()];
    layout.set_position(
        &mut velocity,
        layout.position(current) - layout.position(prev),
    );
    for joint in 0..layout.joint_count() {
        let relative = layout.rotation(prev, joint).inverse() * layout.rotation(current, joint);
        layout.set_rotation(&mut velocity, joint, relative);
    }
    velocity
}

struct ToeJoints {
    left: usize,
    right: usize,
}

impl ToeJoints {
    fn resolve(
        skeleton: &(impl SkeletonLike + ?Sized),
        config: &MotionGraphConfig,
    ) -> ConstructionResult<Self> {
        let lookup = |name: &str| {
            skeleton
                .joint_index(name)
                .ok_or_else(|| ConstructionError::MissingJoint(name.to_string()))
        };
        Ok(Self {
            left: lookup(&config.left_toe)?,
            right: lookup(&config.right_toe)?,
        })
    }

    fn contact(
        &self,
        skeleton: &(impl SkeletonLike + ?Sized),
        config: &MotionGraphConfig,
        prev: &[f32],
        current: &[f32],
    ) -> ContactSignal {
        let height = |pose: &[f32], joint: usize| {
            config
                .up_axis
                .component(skeleton.global_position(pose, joint))
        };
        let frame_time = skeleton.frame_time();
        let left_height = height(current, self.left);
        let right_height = height(current, self.right);

        ContactSignal {
            left_velocity: (left_height - height(prev, self.left)) / frame_time,
            right_velocity: (right_height - height(prev, self.right)) / frame_time,
            left_height,
            right_height,
        }
    }
}

fn validate_clips(layout: &PoseLayout, clips: &[MotionClip]) -> ConstructionResult<()> {
    if clips.is_empty() {
        return Err(ConstructionError::NoClips);
    }
    for (clip_index, clip) in clips.iter().enumerate() {
        if clip.len() < 2 {
            return Err(ConstructionError::ClipTooShort {
                clip: clip_index,
                frames: clip.len(),
            });
        }
        if let Some((frame, values)) = clip
            .frames
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != layout.len())
        {
            return Err(ConstructionError::FrameLayoutMismatch {
                clip: clip_index,
                frame,
                expected: layout.len(),
                found: values.len(),
            });
        }
    }
    Ok(())
}

/// Turns captured clips into graph nodes.
///
/// The first frame of every clip only serves as the predecessor of the second one and does
/// not become a node. Node ids are assigned in clip order, so consecutive frames of a clip
/// get consecutive ids. Every node's root position and orientation are replaced by the
/// canonical ones from `config`; joint rotations are kept as captured.
pub fn extract_nodes(
    skeleton: &(impl SkeletonLike + ?Sized),
    clips: &[MotionClip],
    config: &MotionGraphConfig,
) -> ConstructionResult<NodeTable> {
    let layout = skeleton.layout();
    if layout.is_empty() {
        return Err(ConstructionError::InvalidSkeleton(
            "a skeleton needs at least one joint".into(),
        ));
    }
    let frame_time = skeleton.frame_time();
    if !frame_time.is_finite() || frame_time <= 0. {
        return Err(ConstructionError::InvalidSkeleton(format!(
            "frame time must be positive, got {frame_time}"
        )));
    }
    validate_clips(&layout, clips)?;
    let toes = ToeJoints::resolve(skeleton, config)?;

    let canonical_position = config.canonical_position();
    let canonical_orientation = config.canonical_orientation();

    let mut nodes = NodeTable::new(layout);
    let mut canonical_pose = vec![0.; layout.len()];

    for (sequence, clip) in clips.iter().enumerate() {
        for pair in clip.frames.windows(2) {
            let (prev, current) = (&pair[0], &pair[1]);

            let velocity = frame_velocity(&layout, prev, current);
            let contact = toes.contact(skeleton, config, prev, current);

            canonical_pose.copy_from_slice(current);
            layout.set_position(&mut canonical_pose, canonical_position);
            layout.set_rotation(&mut canonical_pose, ROOT_JOINT, canonical_orientation);

            nodes.push(sequence, &canonical_pose, &velocity, contact);
        }
        debug!(
            "Extracted {} nodes from clip {}",
            clip.len() - 1,
            sequence
        );
    }

    if nodes.is_empty() {
        return Err(ConstructionError::EmptyNodeTable);
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{Joint, MotionSkeleton};
    use bevy::math::{EulerRot, Quat, Vec3};

    fn skeleton() -> MotionSkeleton {
        MotionSkeleton::new(
            vec![
                Joint::root("Hips"),
                Joint::child("LeftToe", 0, Vec3::new(0.1, -1., 0.)),
                Joint::child("RightToe", 0, Vec3::new(-0.1, -1., 0.)),
            ],
            0.5,
        )
        .unwrap()
    }

    fn frame(layout: &PoseLayout, position: Vec3, root: Quat) -> Vec<f32> {
        let mut values = vec![0.; layout.len()];
        layout.set_position(&mut values, position);
        layout.set_rotation(&mut values, 0, root);
        layout.set_rotation(&mut values, 1, Quat::from_rotation_z(0.1));
        layout.set_rotation(&mut values, 2, Quat::IDENTITY);
        values
    }

    #[test]
    fn first_frame_of_each_clip_is_dropped() {
        let skeleton = skeleton();
        let layout = skeleton.layout();
        let clip = MotionClip::new(vec![
            frame(&layout, Vec3::new(0., 1., 0.), Quat::IDENTITY),
            frame(&layout, Vec3::new(0., 1., 1.), Quat::IDENTITY),
            frame(&layout, Vec3::new(0., 1., 2.), Quat::IDENTITY),
        ]);

        let nodes =
            extract_nodes(&skeleton, &[clip.clone(), clip], &MotionGraphConfig::default())
                .unwrap();

        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes.get(1).unwrap().source_sequence_id, 0);
        assert_eq!(nodes.get(2).unwrap().source_sequence_id, 1);
    }

    #[test]
    fn root_is_canonicalized_but_velocity_keeps_motion() {
        let skeleton = skeleton();
        let layout = skeleton.layout();
        let turn = Quat::from_rotation_y(0.3);
        let clip = MotionClip::new(vec![
            frame(&layout, Vec3::new(5., 1., 0.), Quat::IDENTITY),
            frame(&layout, Vec3::new(5., 2., 1.), turn),
        ]);

        let nodes = extract_nodes(&skeleton, &[clip], &MotionGraphConfig::default()).unwrap();
        let node = nodes.get(0).unwrap();

        assert_eq!(layout.position(node.pose), Vec3::ZERO);
        assert_eq!(layout.rotation(node.pose, 0), Quat::IDENTITY);
        assert_eq!(layout.rotation(node.pose, 1), Quat::from_rotation_z(0.1));
        assert_eq!(layout.position(node.velocity), Vec3::new(0., 1., 1.));
        assert!(layout.rotation(node.velocity, 0).abs_diff_eq(turn, 1e-6));
        // Both toes move up by 1 over a 0.5s frame.
        assert!((node.contact.left_velocity - 2.).abs() < 1e-5);
        assert!((node.contact.right_velocity - 2.).abs() < 1e-5);
        assert!((node.contact.left_height - 1.).abs() < 1e-5);
    }

    #[test]
    fn velocity_rebuilds_the_next_frame() {
        let skeleton = skeleton();
        let layout = skeleton.layout();
        let frames: Vec<Vec<f32>> = (0..6)
            .map(|i| {
                let t = i as f32;
                let mut values = vec![0.; layout.len()];
                let position = Vec3::new(0.3 * t, 1. + 0.1 * t.sin(), -0.2 * t);
                layout.set_position(&mut values, position);
                for joint in 0..layout.joint_count() {
                    let j = joint as f32;
                    let rotation = Quat::from_euler(
                        EulerRot::XYZ,
                        0.4 + 0.2 * t + j,
                        -0.3 * t,
                        0.1 * (t + 1.) * (j + 1.),
                    );
                    layout.set_rotation(&mut values, joint, rotation);
                }
                values
            })
            .collect();

        let nodes = extract_nodes(
            &skeleton,
            &[MotionClip::new(frames.clone())],
            &MotionGraphConfig::default(),
        )
        .unwrap();

        assert_eq!(nodes.len(), 5);
        for node in nodes.iter() {
            let previous = &frames[node.frame_id];
            let current = &frames[node.frame_id + 1];
            let position = layout.position(previous) + layout.position(node.velocity);
            assert!(position.abs_diff_eq(layout.position(current), 1e-5));
            for joint in 0..layout.joint_count() {
                let rebuilt =
                    layout.rotation(previous, joint) * layout.rotation(node.velocity, joint);
                assert!(rebuilt.abs_diff_eq(layout.rotation(current, joint), 1e-5));
            }
        }
    }

    #[test]
    fn rejects_degenerate_input() {
        let skeleton = skeleton();
        let layout = skeleton.layout();
        let config = MotionGraphConfig::default();
        let one_frame = MotionClip::new(vec![frame(&layout, Vec3::ZERO, Quat::IDENTITY)]);

        assert_eq!(
            extract_nodes(&skeleton, &[], &config),
            Err(ConstructionError::NoClips)
        );
        assert_eq!(
            extract_nodes(&skeleton, &[one_frame], &config),
            Err(ConstructionError::ClipTooShort { clip: 0, frames: 1 })
        );

        let short_frame = MotionClip::new(vec![
            frame(&layout, Vec3::ZERO, Quat::IDENTITY),
            vec![0.; 3],
        ]);
        assert!(matches!(
            extract_nodes(&skeleton, &[short_frame], &config),
            Err(ConstructionError::FrameLayoutMismatch { frame: 1, .. })
        ));

        let config = MotionGraphConfig {
            left_toe: "lToe".into(),
            ..Default::default()
        };
        let clip = MotionClip::new(vec![
            frame(&layout, Vec3::ZERO, Quat::IDENTITY),
            frame(&layout, Vec3::ZERO, Quat::IDENTITY),
        ]);
        assert_eq!(
            extract_nodes(&skeleton, &[clip], &config),
            Err(ConstructionError::MissingJoint("lToe".into()))
        );
    }
}
