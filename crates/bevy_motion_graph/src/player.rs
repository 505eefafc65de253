use bevy::{asset::prelude::*, ecs::prelude::*, log::warn, reflect::prelude::*};
use bevy_motion_graph_core::{
    errors::TraversalError, motion_graph::MotionGraph, node_table::FrameId,
    pose::SynthesizedPose, traversal::TraversalSession,
};

/// Motion graph playback controls
#[derive(Component, Reflect)]
#[reflect(Component, Default)]
pub struct MotionGraphPlayer {
    pub(crate) graph: Option<Handle<MotionGraph>>,
    pub(crate) paused: bool,
    turn: f32,
    speed: f32,
    seed: Option<u64>,
    /// Seconds accumulated towards the next graph frame
    elapsed: f32,

    #[reflect(ignore)]
    session: Option<TraversalSession>,
    #[reflect(ignore)]
    pose: Option<SynthesizedPose>,
    /// Error that ocurred during the last advance
    #[reflect(ignore)]
    error: Option<TraversalError>,
}

impl Default for MotionGraphPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionGraphPlayer {
    /// Create a new player, with no graph playing
    pub fn new() -> Self {
        Self {
            graph: None,
            paused: false,
            turn: 0.,
            speed: 1.,
            seed: None,
            elapsed: 0.,
            session: None,
            pose: None,
            error: None,
        }
    }

    /// Set the motion graph to play
    pub fn with_graph(mut self, graph: Handle<MotionGraph>) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Make the walk reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Start playing a graph from its start node.
    pub fn start(&mut self, graph: Handle<MotionGraph>) -> &mut Self {
        self.graph = Some(graph);
        self.paused = false;
        self.reset()
    }

    /// Restart the walk on the next advance.
    pub fn reset(&mut self) -> &mut Self {
        self.session = None;
        self.pose = None;
        self.error = None;
        self.elapsed = 0.;
        self
    }

    pub fn pause(&mut self) -> &mut Self {
        self.paused = true;
        self
    }

    pub fn resume(&mut self) -> &mut Self {
        self.paused = false;
        self
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Yaw applied on each transition, in radians.
    pub fn set_turn(&mut self, turn: f32) -> &mut Self {
        self.turn = turn;
        self
    }

    pub fn turn(&self) -> f32 {
        self.turn
    }

    /// Playback speed multiplier. Non-finite values are ignored.
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

    pub fn get_motion_graph(&self) -> Option<Handle<MotionGraph>> {
        self.graph.clone()
    }

    /// The pose synthesized by the most recent tick.
    pub fn pose(&self) -> Option<&SynthesizedPose> {
        self.pose.as_ref()
    }

    pub fn current_frame(&self) -> Option<FrameId> {
        self.session.as_ref().map(TraversalSession::current_frame)
    }

    /// If the last advance failed return the error, otherwise return `None`.
    pub fn get_error(&self) -> Option<TraversalError> {
        self.error.clone()
    }

    /// Accumulates `delta` seconds and takes one tick for every whole frame of the graph's
    /// frame time.
    pub fn advance(&mut self, graph: &MotionGraph, delta: f32) {
        if self.paused {
            return;
        }

        let session = match self.session.take() {
            Some(session) => Ok(session),
            None => TraversalSession::new(graph).map(|session| match self.seed {
                Some(seed) => session.with_seed(seed),
                None => session,
            }),
        };
        let mut session = match session {
            Ok(session) => session,
            Err(error) => {
                warn!("Could not start motion graph playback: {}", error);
                self.error = Some(error);
                return;
            }
        };

        let frame_time = graph.frame_time();
        self.elapsed += delta;
        session.set_turn(self.turn).set_speed(self.speed);

        while self.elapsed >= frame_time {
            self.elapsed -= frame_time;
            match session.tick(graph) {
                Ok(pose) => {
                    self.pose = Some(pose);
                    self.error = None;
                }
                Err(error) => {
                    warn!("Motion graph playback stopped: {}", error);
                    self.error = Some(error);
                    self.elapsed = 0.;
                    return;
                }
            }
            if frame_time <= 0. {
                self.elapsed = 0.;
                break;
            }
        }

        self.session = Some(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::{Quat, Vec3};
    use bevy_motion_graph_core::{
        config::MotionGraphConfig,
        extraction::MotionClip,
        skeleton::{Joint, MotionSkeleton, SkeletonLike},
    };

    const FRAME_TIME: f32 = 0.1;

    /// A single walking clip whose stride repeats every four frames, so every frame links to
    /// the matching frame of the next stride.
    fn looping_graph() -> MotionGraph {
        let skeleton = MotionSkeleton::new(
            vec![
                Joint::root("Hips"),
                Joint::child("LeftUpLeg", 0, Vec3::new(0.1, -0.9, 0.)),
                Joint::child("RightUpLeg", 0, Vec3::new(-0.1, -0.9, 0.)),
                Joint::child("LeftToe", 1, Vec3::new(0., 0., 0.3)),
                Joint::child("RightToe", 2, Vec3::new(0., 0., 0.3)),
            ],
            FRAME_TIME,
        )
        .unwrap();
        let layout = skeleton.layout();

        let frames = (0..=12)
            .map(|frame| {
                let swing = 0.3 * (std::f32::consts::FRAC_PI_2 * frame as f32 + 0.1).sin();
                let mut values = vec![0.; layout.len()];
                layout.set_position(&mut values, Vec3::new(0., 1., 0.1 * frame as f32));
                for joint in 0..layout.joint_count() {
                    layout.set_rotation(&mut values, joint, Quat::IDENTITY);
                }
                layout.set_rotation(&mut values, 1, Quat::from_rotation_x(swing));
                layout.set_rotation(&mut values, 2, Quat::from_rotation_x(-swing));
                values
            })
            .collect();

        MotionGraph::build(
            &skeleton,
            &[MotionClip::new(frames)],
            MotionGraphConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn ticks_once_per_whole_frame() {
        let graph = looping_graph();
        let mut player = MotionGraphPlayer::new().with_seed(1);

        player.advance(&graph, 0.05);
        assert!(player.pose().is_none());
        assert_eq!(player.current_frame(), Some(graph.start_node().unwrap()));

        player.advance(&graph, 0.06);
        assert!(player.pose().is_some());
        assert!(player.get_error().is_none());

        let before = player.pose().unwrap().position();
        player.advance(&graph, 0.25);
        let after = player.pose().unwrap().position();
        assert!(after.z > before.z);
    }

    #[test]
    fn paused_player_does_not_move() {
        let graph = looping_graph();
        let mut player = MotionGraphPlayer::new().with_seed(1);
        player.advance(&graph, 0.15);
        let frame = player.current_frame();

        player.pause();
        player.advance(&graph, 1.);
        assert_eq!(player.current_frame(), frame);

        player.resume().reset();
        assert!(player.current_frame().is_none());
        assert!(player.pose().is_none());
    }

    #[test]
    fn runaway_speed_stays_bounded() {
        let graph = looping_graph();
        let mut player = MotionGraphPlayer::new().with_seed(1);

        player.set_speed(4.).set_speed(f32::INFINITY);
        assert_eq!(player.speed(), 4.);

        player.set_speed(1e9);
        player.advance(&graph, 0.15);
        assert!(player.pose().is_some());
        assert!(player.get_error().is_none());
    }
}
