use thiserror::Error;

use crate::node_table::FrameId;

/// Faults raised while walking a motion graph.
///
/// A correctly pruned graph never produces these: they mean a construction invariant
/// was broken, or that a session is being ticked against a graph it was not started on.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraversalError {
    #[error("The motion graph has no playable nodes")]
    EmptyGraph,
    #[error("Node {0} is not part of the playable set")]
    NotPlayable(FrameId),
    #[error("Node {0} has no successors, the graph is exhausted")]
    Exhausted(FrameId),
}

pub type TraversalResult<T> = Result<T, TraversalError>;
