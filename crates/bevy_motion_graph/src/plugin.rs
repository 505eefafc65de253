use bevy::{
    app::{App, Plugin, Update},
    asset::AssetApp,
    ecs::schedule::{IntoScheduleConfigs, SystemSet},
};
use bevy_motion_graph_core::{
    config::MotionGraphConfig,
    contact::{ContactPhase, ContactSignal},
    motion_graph::MotionGraph,
};

use crate::{player::MotionGraphPlayer, systems::advance_motion_graph_players};

/// Adds motion graph assets and playback to an app
pub struct MotionGraphPlugin;

#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum MotionGraphSystems {
    /// Ticks every [`MotionGraphPlayer`] by the frame's elapsed time.
    Advance,
}

impl Plugin for MotionGraphPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<MotionGraph>()
            .register_type::<MotionGraphPlayer>()
            .register_type::<MotionGraphConfig>()
            .register_type::<ContactSignal>()
            .register_type::<ContactPhase>()
            .configure_sets(Update, MotionGraphSystems::Advance)
            .add_systems(
                Update,
                advance_motion_graph_players.in_set(MotionGraphSystems::Advance),
            );
    }
}
