//! Snapshot builder — flattens the ECS world into the serializable view
//! handed to rendering, scoring, and network mirrors.

use hecs::World;

use snipes_core::components::{BulletState, FlightPath, GridPos, HiveState, SnipeState};
use snipes_core::enums::GamePhase;
use snipes_core::events::SimEvent;
use snipes_core::state::{
    BulletView, GameStateSnapshot, HiveView, PlayerView, ScoreView, SnipeView,
};
use snipes_core::types::SimTime;

use crate::engine::{PlayerState, ScoreState};
use crate::systems::bullets::step_sign;

/// Build the post-tick snapshot. Views are sorted by id so identical
/// states serialize identically.
#[allow(clippy::too_many_arguments)]
pub fn build(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    level: u32,
    initials: &str,
    score: &ScoreState,
    player: &PlayerState,
    events: Vec<SimEvent>,
) -> GameStateSnapshot {
    let mut bullets: Vec<BulletView> = world
        .query::<(&BulletState, &FlightPath)>()
        .iter()
        .filter(|(_, (state, _))| state.removed.is_none())
        .map(|(_, (state, path))| BulletView {
            id: state.id,
            owner: state.owner,
            x: path.pos.x,
            y: path.pos.y,
            prev_x: path.prev.x,
            prev_y: path.prev.y,
            dir_x: step_sign(path.vel.x),
            dir_y: step_sign(path.vel.y),
        })
        .collect();
    bullets.sort_by_key(|b| b.id);

    let mut snipes: Vec<SnipeView> = world
        .query::<(&SnipeState, &GridPos)>()
        .iter()
        .filter(|(_, (state, _))| state.alive)
        .map(|(_, (state, pos))| SnipeView {
            id: state.id,
            variant: state.variant,
            x: pos.cell.x,
            y: pos.cell.y,
            prev_x: pos.prev.x,
            prev_y: pos.prev.y,
            dir_x: state.dir.x,
            dir_y: state.dir.y,
        })
        .collect();
    snipes.sort_by_key(|s| s.id);

    let mut hives: Vec<HiveView> = world
        .query::<(&HiveState, &GridPos)>()
        .iter()
        .map(|(_, (state, pos))| HiveView {
            id: state.id,
            x: pos.cell.x,
            y: pos.cell.y,
            hits: state.hits,
            destroyed: state.destroyed,
            remaining: state.remaining(),
            flash_interval_ms: state.flash_interval_ms,
        })
        .collect();
    hives.sort_by_key(|h| h.id);

    GameStateSnapshot {
        time: *time,
        phase,
        level,
        initials: initials.to_owned(),
        score: ScoreView {
            score: score.score,
            lives: score.lives,
            snipes_killed: score.snipes_killed,
            hives_destroyed: score.hives_destroyed,
        },
        player: PlayerView {
            x: player.cell.x,
            y: player.cell.y,
            alive: player.alive,
        },
        bullets,
        snipes,
        hives,
        events,
    }
}
