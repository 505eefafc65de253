//! # Bevy Motion Graph Core
//!
//! Builds a **motion graph** out of captured animation clips and walks it to synthesize
//! continuous, never-ending motion.
//!
//! Every captured frame becomes a node carrying its joint rotations, its per-frame velocity and
//! a foot contact signal. Directed edges connect frames that can be played one after the other
//! without a visible pop: consecutive frames of the same clip (the _backbone_) and pairs of
//! frames that are similar enough in pose, velocity and foot contact. The graph is then pruned
//! to its largest strongly connected component so that a walk can always continue.
//!
//! ## Building
//!
//! ```ignore
//! let skeleton = MotionSkeleton::new(joints, 1. / 30.)?;
//! let graph = MotionGraph::build(&skeleton, &clips, MotionGraphConfig::default())?;
//! ```
//!
//! The similarity threshold and the remaining knobs live in [`MotionGraphConfig`], which can
//! also be loaded from RON.
//!
//! ## Traversal
//!
//! A [`MotionGraph`] is immutable. Walks are driven by a [`TraversalSession`], which owns the
//! random source, the current node and the accumulated root placement. Many sessions can
//! share one graph.
//!
//! ```ignore
//! let mut session = TraversalSession::new(&graph)?.with_seed(7);
//! session.set_turn(0.02).set_speed(2.);
//! let pose = session.tick(&graph)?;
//! ```
//!
//! [`MotionGraph::pose_by_trajectory`] produces a bounded run of poses that travels along a
//! fixed heading instead.
//!
//! [`MotionGraphConfig`]: crate::config::MotionGraphConfig
//! [`MotionGraph`]: crate::motion_graph::MotionGraph
//! [`MotionGraph::pose_by_trajectory`]: crate::motion_graph::MotionGraph::pose_by_trajectory
//! [`TraversalSession`]: crate::traversal::TraversalSession

pub mod builder;
pub mod config;
pub mod connectivity;
pub mod contact;
pub mod dot_output;
pub mod errors;
pub mod extraction;
pub mod motion_graph;
pub mod node_table;
pub mod pose;
pub mod similarity;
pub mod skeleton;
pub mod traversal;

pub mod prelude {
    pub use super::config::{Axis, MotionGraphConfig};
    pub use super::contact::{ContactPhase, ContactSignal};
    pub use super::dot_output::ToDot;
    pub use super::errors::*;
    pub use super::extraction::MotionClip;
    pub use super::motion_graph::{BuildReport, MotionGraph};
    pub use super::node_table::{FrameId, NodeRef, NodeTable};
    pub use super::pose::{PoseLayout, ROOT_JOINT, SynthesizedPose};
    pub use super::skeleton::{Joint, MotionSkeleton, SkeletonLike};
    pub use super::traversal::{
        AvoidBackwardLoops, FrameCount, RootState, Trajectory, TransitionChoice, TransitionEvent,
        TransitionObserver, TransitionPolicy, TraversalSession, UniformTransitions,
    };
}
