use thiserror::Error;

use crate::node_table::FrameId;

/// Possible errors that can be produced while building a motion graph. Any of these aborts
/// construction; a graph is never returned in a partially built state.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("Invalid motion graph configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid skeleton: {0}")]
    InvalidSkeleton(String),
    #[error("Joint {0:?} is not present in the skeleton")]
    MissingJoint(String),
    #[error("No motion clips were provided")]
    NoClips,
    #[error("Clip {clip} has {frames} frame(s), at least 2 are needed to derive velocities")]
    ClipTooShort { clip: usize, frames: usize },
    #[error("Frame {frame} of clip {clip} has {found} values, the skeleton layout expects {expected}")]
    FrameLayoutMismatch {
        clip: usize,
        frame: usize,
        expected: usize,
        found: usize,
    },
    #[error("{lists} successor lists were given for {nodes} nodes")]
    AdjacencyMismatch { lists: usize, nodes: usize },
    #[error("Extraction produced no nodes")]
    EmptyNodeTable,
    #[error("None of the {components} strongly connected components contains a cycle")]
    NoPlayableComponent { components: usize },
    #[error("Node {0} has no outgoing edges after pruning")]
    DeadEndAfterPrune(FrameId),
    #[error("Graph construction was cancelled")]
    Cancelled,
}

pub type ConstructionResult<T> = Result<T, ConstructionError>;
