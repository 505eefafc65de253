//! # Bevy Motion Graph
//!
//! Bevy integration for [`bevy_motion_graph_core`]: registers [`MotionGraph`] as an asset and
//! drives one traversal per [`MotionGraphPlayer`] entity from the app's [`Time`].
//!
//! ```ignore
//! app.add_plugins(MotionGraphPlugin);
//!
//! let graph = graphs.add(MotionGraph::build(&skeleton, &clips, config)?);
//! commands.spawn(MotionGraphPlayer::new().with_graph(graph).with_seed(42));
//! ```
//!
//! The latest synthesized pose is available through [`MotionGraphPlayer::pose`] and is left
//! for the caller to apply to its own skeleton.
//!
//! [`MotionGraph`]: bevy_motion_graph_core::motion_graph::MotionGraph
//! [`Time`]: bevy::time::Time

pub mod player;
pub mod plugin;
pub mod systems;

pub use bevy_motion_graph_core as core;

pub mod prelude {
    pub use super::player::MotionGraphPlayer;
    pub use super::plugin::{MotionGraphPlugin, MotionGraphSystems};
    pub use bevy_motion_graph_core::prelude::*;
}
