use bevy::{asset::Asset, log::info, reflect::TypePath};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;

use crate::{
    builder::{Adjacency, BuildCounts, build_candidate_edges},
    config::MotionGraphConfig,
    connectivity::prune_to_largest_component,
    errors::{ConstructionError, ConstructionResult, TraversalError, TraversalResult},
    extraction::{MotionClip, extract_nodes},
    node_table::{FrameId, NodeRef, NodeTable},
    pose::PoseLayout,
    skeleton::SkeletonLike,
    traversal::{
        AvoidBackwardLoops, RootState, Trajectory, TransitionEvent, TransitionPolicy, follow_heading,
    },
};

/// Summary of a graph build.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub node_count: usize,
    pub candidate_edges: usize,
    /// Pair classification behind `candidate_edges`.
    pub candidates: BuildCounts,
    pub component_count: usize,
    pub playable_count: usize,
    pub retained_edges: usize,
}

/// Directed graph of captured frames where every edge is a plausible transition, restricted
/// to a strongly connected node set so that a walk never dead-ends.
///
/// Immutable once built. Walks are driven by a
/// [`TraversalSession`](crate::traversal::TraversalSession).
#[derive(Asset, TypePath, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MotionGraph {
    config: MotionGraphConfig,
    frame_time: f32,
    nodes: NodeTable,
    /// Indexed by frame id, empty outside the playable set.
    successors: Adjacency,
    /// Sorted ascending.
    playable: Vec<FrameId>,
    report: BuildReport,
}

impl MotionGraph {
    pub fn build(
        skeleton: &(impl SkeletonLike + ?Sized),
        clips: &[MotionClip],
        config: MotionGraphConfig,
    ) -> ConstructionResult<Self> {
        Self::build_cancellable(skeleton, clips, config, None)
    }

    /// Like [`MotionGraph::build`], giving up with [`ConstructionError::Cancelled`] once
    /// `cancel` is set. The flag is polled between batches of pair evaluations.
    pub fn build_cancellable(
        skeleton: &(impl SkeletonLike + ?Sized),
        clips: &[MotionClip],
        config: MotionGraphConfig,
        cancel: Option<&AtomicBool>,
    ) -> ConstructionResult<Self> {
        config.validate()?;
        info!("Building motion graph from {} clips", clips.len());

        let nodes = extract_nodes(skeleton, clips, &config)?;
        info!("Extracted {} nodes", nodes.len());

        let (candidates, counts) = build_candidate_edges(&nodes, &config, cancel)?;
        Self::finish(nodes, candidates, counts, config, skeleton.frame_time())
    }

    /// Finishes a graph from already extracted nodes and candidate edges.
    ///
    /// Rejected pairs were never seen here, so the report only splits the candidate edges into
    /// backbone and similar ones.
    pub fn from_candidates(
        nodes: NodeTable,
        candidates: Adjacency,
        config: MotionGraphConfig,
        frame_time: f32,
    ) -> ConstructionResult<Self> {
        let mut counts = BuildCounts::default();
        for (from, successors) in candidates.iter().enumerate() {
            for &to in successors {
                let backbone = match (nodes.get(from), nodes.get(to)) {
                    (Some(a), Some(b)) => a.is_followed_by(&b),
                    _ => false,
                };
                if backbone {
                    counts.backbone += 1;
                } else {
                    counts.similar += 1;
                }
            }
        }
        Self::finish(nodes, candidates, counts, config, frame_time)
    }

    fn finish(
        nodes: NodeTable,
        candidates: Adjacency,
        counts: BuildCounts,
        config: MotionGraphConfig,
        frame_time: f32,
    ) -> ConstructionResult<Self> {
        if nodes.is_empty() {
            return Err(ConstructionError::EmptyNodeTable);
        }
        if candidates.len() != nodes.len() {
            return Err(ConstructionError::AdjacencyMismatch {
                lists: candidates.len(),
                nodes: nodes.len(),
            });
        }

        let pruned = prune_to_largest_component(&candidates)?;
        let report = BuildReport {
            node_count: nodes.len(),
            candidate_edges: candidates.iter().map(Vec::len).sum(),
            candidates: counts,
            component_count: pruned.component_count,
            playable_count: pruned.playable.len(),
            retained_edges: pruned.successors.iter().map(Vec::len).sum(),
        };
        info!(
            "Motion graph ready: {} playable nodes, {} edges",
            report.playable_count, report.retained_edges
        );

        Ok(Self {
            config,
            frame_time,
            nodes,
            successors: pruned.successors,
            playable: pruned.playable,
            report,
        })
    }

    pub fn config(&self) -> &MotionGraphConfig {
        &self.config
    }

    pub fn layout(&self) -> PoseLayout {
        self.nodes.layout()
    }

    pub fn frame_time(&self) -> f32 {
        self.frame_time
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// All extracted nodes, including the ones outside the playable set.
    pub fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    pub fn node(&self, frame_id: FrameId) -> Option<NodeRef<'_>> {
        self.nodes.get(frame_id)
    }

    /// The node, only if it is a valid traversal state.
    pub fn playable_node(&self, frame_id: FrameId) -> Option<NodeRef<'_>> {
        if self.is_playable(frame_id) {
            self.nodes.get(frame_id)
        } else {
            None
        }
    }

    /// Ordered successors of a playable node. `None` outside the playable set.
    pub fn successors(&self, frame_id: FrameId) -> Option<&[FrameId]> {
        if self.is_playable(frame_id) {
            self.successors.get(frame_id).map(Vec::as_slice)
        } else {
            None
        }
    }

    pub fn playable_set(&self) -> &[FrameId] {
        &self.playable
    }

    pub fn is_playable(&self, frame_id: FrameId) -> bool {
        self.playable.binary_search(&frame_id).is_ok()
    }

    /// Where every walk starts: the lowest playable frame id.
    pub fn start_node(&self) -> Option<FrameId> {
        self.playable.first().copied()
    }

    pub fn edge_count(&self) -> usize {
        self.report.retained_edges
    }

    /// Every retained edge as `(from, to)`, ordered by source then target.
    pub fn edges(&self) -> impl Iterator<Item = (FrameId, FrameId)> + '_ {
        self.playable.iter().flat_map(move |&from| {
            self.successors
                .get(from)
                .into_iter()
                .flatten()
                .map(move |&to| (from, to))
        })
    }

    /// Poses for `frame_budget` transitions from the start node, facing and travelling
    /// along `heading` radians of yaw, with backward-loop avoidance.
    pub fn pose_by_trajectory(
        &self,
        heading: f32,
        frame_budget: usize,
        rng: &mut StdRng,
    ) -> TraversalResult<Trajectory> {
        let policy = AvoidBackwardLoops::new(self.config.backward_loop_window);
        self.pose_by_trajectory_with(&policy, heading, frame_budget, rng)
    }

    pub fn pose_by_trajectory_with<P: TransitionPolicy + ?Sized>(
        &self,
        policy: &P,
        heading: f32,
        frame_budget: usize,
        rng: &mut StdRng,
    ) -> TraversalResult<Trajectory> {
        let mut current = self.start_node().ok_or(TraversalError::EmptyGraph)?;
        let start = self
            .playable_node(current)
            .ok_or(TraversalError::NotPlayable(current))?;
        let mut root = RootState::from_pose(&self.config, &self.layout(), start.pose);

        follow_heading(
            self,
            policy,
            rng,
            &mut current,
            &mut root,
            heading,
            frame_budget,
            &mut |_: &TransitionEvent| {},
        )
    }
}
