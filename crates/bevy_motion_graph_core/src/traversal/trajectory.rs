use rand::rngs::StdRng;

use super::{FrameCount, RootState, TransitionEvent, TransitionPolicy, normalize_angle, select_next};
use crate::{
    errors::TraversalResult, motion_graph::MotionGraph, node_table::FrameId,
    pose::SynthesizedPose,
};

/// Poses synthesized while holding a fixed heading.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    /// Heading in radians, wrapped into `(-PI, PI]`.
    pub heading: f32,
    pub poses: Vec<SynthesizedPose>,
}

impl Trajectory {
    pub fn frame_count(&self) -> FrameCount {
        FrameCount::Finite(self.poses.len())
    }
}

/// Walks `frame_budget` transitions from `current`, facing and moving along `heading`.
/// `current` and `root` are left at the final state.
#[allow(clippy::too_many_arguments)]
pub(crate) fn follow_heading<P: TransitionPolicy + ?Sized>(
    graph: &MotionGraph,
    policy: &P,
    rng: &mut StdRng,
    current: &mut FrameId,
    root: &mut RootState,
    heading: f32,
    frame_budget: usize,
    observer: &mut dyn FnMut(&TransitionEvent),
) -> TraversalResult<Trajectory> {
    let config = graph.config();
    let layout = graph.layout();
    let heading = normalize_angle(heading);
    *root = RootState::facing(config, root.position, heading);

    let mut poses = Vec::with_capacity(frame_budget);
    for _ in 0..frame_budget {
        let (choice, node) = select_next(graph, policy, rng, *current)?;
        root.translate(config, &layout, &node);
        observer(&TransitionEvent {
            from: *current,
            to: choice.next,
            resampled: choice.resampled,
        });
        *current = choice.next;
        poses.push(SynthesizedPose::new(
            node.frame_id,
            layout,
            node.pose,
            root.position,
            root.orientation,
        ));
    }

    Ok(Trajectory { heading, poses })
}
