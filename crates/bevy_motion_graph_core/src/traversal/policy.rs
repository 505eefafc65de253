use rand::{Rng, rngs::StdRng};

use crate::node_table::FrameId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionChoice {
    pub next: FrameId,
    /// Whether the first draw was rejected and a second one taken.
    pub resampled: bool,
}

/// Strategy for picking the next node out of the current node's successors.
pub trait TransitionPolicy: Send + Sync {
    /// Returns `None` only when `successors` is empty.
    fn choose(
        &self,
        current: FrameId,
        successors: &[FrameId],
        rng: &mut StdRng,
    ) -> Option<TransitionChoice>;
}

fn draw(successors: &[FrameId], rng: &mut StdRng) -> Option<FrameId> {
    if successors.is_empty() {
        return None;
    }
    Some(successors[rng.random_range(0..successors.len())])
}

/// Picks a successor uniformly at random.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformTransitions;

impl TransitionPolicy for UniformTransitions {
    fn choose(
        &self,
        _current: FrameId,
        successors: &[FrameId],
        rng: &mut StdRng,
    ) -> Option<TransitionChoice> {
        draw(successors, rng).map(|next| TransitionChoice {
            next,
            resampled: false,
        })
    }
}

/// Uniform choice that draws once more when the first draw lands slightly behind the
/// current node, which tends to trap playback in short backward loops. The second draw is
/// accepted whatever it is.
#[derive(Clone, Copy, Debug)]
pub struct AvoidBackwardLoops {
    pub window: usize,
}

impl Default for AvoidBackwardLoops {
    fn default() -> Self {
        Self { window: 10 }
    }
}

impl AvoidBackwardLoops {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn is_backward_loop(&self, current: FrameId, candidate: FrameId) -> bool {
        candidate < current && current - candidate < self.window
    }
}

impl TransitionPolicy for AvoidBackwardLoops {
    fn choose(
        &self,
        current: FrameId,
        successors: &[FrameId],
        rng: &mut StdRng,
    ) -> Option<TransitionChoice> {
        let first = draw(successors, rng)?;
        if !self.is_backward_loop(current, first) {
            return Some(TransitionChoice {
                next: first,
                resampled: false,
            });
        }
        draw(successors, rng).map(|next| TransitionChoice {
            next,
            resampled: true,
        })
    }
}
