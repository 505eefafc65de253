use bevy::log::warn;
use rand::{SeedableRng, rngs::StdRng};
use std::fmt::Debug;

use super::{
    AvoidBackwardLoops, FrameCount, RootState, Trajectory, TransitionEvent, TransitionPolicy,
    normalize_angle, select_next, trajectory::follow_heading,
};
use crate::{
    errors::{TraversalError, TraversalResult},
    motion_graph::MotionGraph,
    node_table::FrameId,
    pose::SynthesizedPose,
};

pub type TransitionObserver = Box<dyn FnMut(&TransitionEvent) + Send + Sync>;

/// Mutable state of one walk over a [`MotionGraph`].
///
/// The graph itself is never mutated, so any number of sessions can share it. A session
/// starts at the lowest playable frame and keeps going for as long as it is ticked.
pub struct TraversalSession<P: TransitionPolicy = AvoidBackwardLoops> {
    policy: P,
    rng: StdRng,
    current: FrameId,
    /// `None` until the first tick.
    root: Option<RootState>,
    turn: f32,
    speed: f32,
    observer: Option<TransitionObserver>,
}

impl TraversalSession {
    /// A session on `graph` using backward-loop avoidance with the graph's configured window.
    pub fn new(graph: &MotionGraph) -> TraversalResult<Self> {
        let policy = AvoidBackwardLoops::new(graph.config().backward_loop_window);
        Self::with_policy(graph, policy)
    }
}

impl<P: TransitionPolicy> TraversalSession<P> {
    pub fn with_policy(graph: &MotionGraph, policy: P) -> TraversalResult<Self> {
        let current = graph.start_node().ok_or(TraversalError::EmptyGraph)?;
        Ok(Self {
            policy,
            rng: StdRng::from_os_rng(),
            current,
            root: None,
            turn: 0.,
            speed: 1.,
            observer: None,
        })
    }

    /// Replaces the random source with a deterministic one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Calls `observer` on every accepted transition.
    pub fn with_observer(
        mut self,
        observer: impl FnMut(&TransitionEvent) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn current_frame(&self) -> FrameId {
        self.current
    }

    pub fn root_state(&self) -> Option<RootState> {
        self.root
    }

    /// Yaw applied on each transition, in radians.
    pub fn set_turn(&mut self, turn: f32) -> &mut Self {
        self.turn = turn;
        self
    }

    pub fn turn(&self) -> f32 {
        self.turn
    }

    /// Playback speed multiplier. Values under the graph's minimum are raised to it; the
    /// integer part is the number of transitions taken per tick, up to the graph's
    /// `max_steps_per_tick`. Non-finite values are ignored.
    pub fn set_speed(&mut self, speed: f32) -> &mut Self {
        if speed.is_finite() {
            self.speed = speed;
        } else {
            warn!("Ignoring non-finite playback speed {}", speed);
        }
        self
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn frame_count(&self) -> FrameCount {
        FrameCount::Unbounded
    }

    /// Returns to the start node; the root is re-seeded on the next tick.
    pub fn reset(&mut self, graph: &MotionGraph) -> TraversalResult<&mut Self> {
        self.current = graph.start_node().ok_or(TraversalError::EmptyGraph)?;
        self.root = None;
        Ok(self)
    }

    fn activate(&mut self, graph: &MotionGraph) -> TraversalResult<RootState> {
        if let Some(root) = self.root {
            return Ok(root);
        }
        let node = graph
            .playable_node(self.current)
            .ok_or(TraversalError::NotPlayable(self.current))?;
        Ok(RootState::from_pose(graph.config(), &graph.layout(), node.pose))
    }

    fn notify(&mut self, event: TransitionEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }

    /// Graph transitions one tick takes at the current speed.
    pub fn steps_per_tick(&self, graph: &MotionGraph) -> usize {
        let config = graph.config();
        let max_steps = config.max_steps_per_tick.max(1);
        let steps = self.speed.max(config.min_playback_speed).floor();
        if steps >= max_steps as f32 {
            max_steps
        } else {
            (steps as usize).max(1)
        }
    }

    /// Advances the walk and returns the resulting absolute pose. On error the session is
    /// left where it was before the tick.
    pub fn tick(&mut self, graph: &MotionGraph) -> TraversalResult<SynthesizedPose> {
        let config = graph.config();
        let layout = graph.layout();
        let turn = normalize_angle(self.turn);
        let steps = self.steps_per_tick(graph);

        let mut root = self.activate(graph)?;
        let mut current = self.current;
        let mut events = Vec::with_capacity(steps);
        for _ in 0..steps {
            let (choice, node) = select_next(graph, &self.policy, &mut self.rng, current)?;
            root.advance(config, &layout, &node, turn);
            events.push(TransitionEvent {
                from: current,
                to: choice.next,
                resampled: choice.resampled,
            });
            current = choice.next;
        }

        let node = graph
            .playable_node(current)
            .ok_or(TraversalError::NotPlayable(current))?;
        self.current = current;
        self.root = Some(root);
        for event in events {
            self.notify(event);
        }

        Ok(SynthesizedPose::new(
            current,
            layout,
            node.pose,
            root.position,
            root.orientation,
        ))
    }

    /// Synthesizes exactly `frame_budget` poses moving along `heading` (radians of yaw from
    /// the canonical forward axis), continuing from the session's current state.
    pub fn follow_heading(
        &mut self,
        graph: &MotionGraph,
        heading: f32,
        frame_budget: usize,
    ) -> TraversalResult<Trajectory> {
        let mut root = self.activate(graph)?;
        let mut current = self.current;
        let mut events = Vec::with_capacity(frame_budget);
        let trajectory = follow_heading(
            graph,
            &self.policy,
            &mut self.rng,
            &mut current,
            &mut root,
            heading,
            frame_budget,
            &mut |event: &TransitionEvent| events.push(*event),
        );
        let trajectory = trajectory?;
        self.current = current;
        self.root = Some(root);
        for event in events {
            self.notify(event);
        }
        Ok(trajectory)
    }
}

impl<P: TransitionPolicy + Debug> Debug for TraversalSession<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraversalSession")
            .field("policy", &self.policy)
            .field("current", &self.current)
            .field("root", &self.root)
            .field("turn", &self.turn)
            .field("speed", &self.speed)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
