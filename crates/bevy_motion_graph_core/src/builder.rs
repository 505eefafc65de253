use bevy::log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    config::MotionGraphConfig,
    errors::{ConstructionError, ConstructionResult},
    node_table::{FrameId, NodeTable},
    similarity::{PairVerdict, evaluate_pair},
};

/// Candidate successors of every node, indexed by [`FrameId`]. Each list is sorted.
pub type Adjacency = Vec<Vec<FrameId>>;

/// How the ordered node pairs of a build were classified.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildCounts {
    pub backbone: usize,
    pub similar: usize,
    pub incompatible_contact: usize,
    pub dissimilar: usize,
}

impl BuildCounts {
    fn record(&mut self, verdict: PairVerdict) {
        match verdict {
            PairVerdict::Backbone => self.backbone += 1,
            PairVerdict::Similar(_) => self.similar += 1,
            PairVerdict::IncompatibleContact => self.incompatible_contact += 1,
            PairVerdict::Dissimilar(_) => self.dissimilar += 1,
            PairVerdict::SameNode => {}
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.backbone += other.backbone;
        self.similar += other.similar;
        self.incompatible_contact += other.incompatible_contact;
        self.dissimilar += other.dissimilar;
        self
    }

    pub fn edges(&self) -> usize {
        self.backbone + self.similar
    }
}

/// Candidate successors of a single node.
pub fn candidate_successors(
    nodes: &NodeTable,
    from: FrameId,
    config: &MotionGraphConfig,
) -> (Vec<FrameId>, BuildCounts) {
    let layout = nodes.layout();
    let mut counts = BuildCounts::default();
    let Some(from) = nodes.get(from) else {
        return (Vec::new(), counts);
    };

    let successors = nodes
        .iter()
        .filter(|to| {
            let verdict = evaluate_pair(&layout, &from, to, config);
            counts.record(verdict);
            verdict.is_edge()
        })
        .map(|to| to.frame_id)
        .collect();

    (successors, counts)
}

/// Evaluates every ordered node pair and returns the candidate adjacency.
///
/// Source rows are split into batches of `config.pair_block_size` and evaluated in parallel;
/// each batch fills its own buffer and buffers are concatenated in row order, so the result
/// does not depend on scheduling. `cancel` is checked before each batch starts.
pub fn build_candidate_edges(
    nodes: &NodeTable,
    config: &MotionGraphConfig,
    cancel: Option<&AtomicBool>,
) -> ConstructionResult<(Adjacency, BuildCounts)> {
    let rows: Vec<FrameId> = (0..nodes.len()).collect();
    let block_size = config.pair_block_size.max(1);

    let batches = rows
        .par_chunks(block_size)
        .map(|block| {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(ConstructionError::Cancelled);
            }
            let mut counts = BuildCounts::default();
            let successors = block
                .iter()
                .map(|&from| {
                    let (successors, row_counts) = candidate_successors(nodes, from, config);
                    counts = counts.merge(row_counts);
                    successors
                })
                .collect::<Vec<_>>();
            Ok((successors, counts))
        })
        .collect::<ConstructionResult<Vec<_>>>();

    let batches = match batches {
        Ok(batches) => batches,
        Err(err) => {
            warn!("Candidate edge construction stopped: {}", err);
            return Err(err);
        }
    };

    let mut adjacency = Vec::with_capacity(nodes.len());
    let mut counts = BuildCounts::default();
    for (successors, batch_counts) in batches {
        adjacency.extend(successors);
        counts = counts.merge(batch_counts);
    }

    debug!(
        "Candidate edges: {} backbone, {} similar; rejected {} on contact, {} on distance",
        counts.backbone, counts.similar, counts.incompatible_contact, counts.dissimilar
    );

    Ok((adjacency, counts))
}
