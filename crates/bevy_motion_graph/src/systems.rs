use bevy::{asset::prelude::*, ecs::prelude::*, time::prelude::*};
use bevy_motion_graph_core::motion_graph::MotionGraph;

use crate::player::MotionGraphPlayer;

/// Advances every unpaused player whose graph asset has finished loading.
pub fn advance_motion_graph_players(
    time: Res<Time>,
    graphs: Res<Assets<MotionGraph>>,
    mut players: Query<&mut MotionGraphPlayer>,
) {
    let delta = time.delta_secs();
    for mut player in &mut players {
        if player.is_paused() {
            continue;
        }
        let Some(handle) = player.get_motion_graph() else {
            continue;
        };
        let Some(graph) = graphs.get(&handle) else {
            continue;
        };
        player.advance(graph, delta);
    }
}
