//! Stochastic walks over a finished [`MotionGraph`].
//!
//! [`MotionGraph`]: crate::motion_graph::MotionGraph

mod policy;
mod root;
mod session;
mod trajectory;

pub use policy::*;
pub use root::RootState;
pub use session::*;
pub use trajectory::Trajectory;
pub(crate) use trajectory::follow_heading;

use bevy::log::error;
use rand::rngs::StdRng;
use std::f32::consts::{PI, TAU};

use crate::{
    errors::{TraversalError, TraversalResult},
    motion_graph::MotionGraph,
    node_table::{FrameId, NodeRef},
};

/// How many frames a pose source produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameCount {
    Unbounded,
    Finite(usize),
}

/// Emitted on every accepted transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionEvent {
    pub from: FrameId,
    pub to: FrameId,
    pub resampled: bool,
}

/// Wraps an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f32) -> f32 {
    PI - (PI - angle).rem_euclid(TAU)
}

pub(crate) fn select_next<'g, P: TransitionPolicy + ?Sized>(
    graph: &'g MotionGraph,
    policy: &P,
    rng: &mut StdRng,
    current: FrameId,
) -> TraversalResult<(TransitionChoice, NodeRef<'g>)> {
    let Some(successors) = graph.successors(current) else {
        error!("Traversal reached node {} outside the playable set", current);
        return Err(TraversalError::NotPlayable(current));
    };
    let Some(choice) = policy.choose(current, successors, rng) else {
        error!("Playable node {} has no successors", current);
        return Err(TraversalError::Exhausted(current));
    };
    let node = graph
        .playable_node(choice.next)
        .ok_or(TraversalError::NotPlayable(choice.next))?;
    Ok((choice, node))
}
