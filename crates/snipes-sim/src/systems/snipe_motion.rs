//! Snipe motion system — per-interval decisions, movement, and mutual
//! bounce.
//!
//! Decisions come from `snipes_ai::evaluate`; this system gates the
//! 200 ms cadence, resolves same-destination conflicts, and commits the
//! surviving moves. Snipes are processed in id order so RNG consumption
//! is deterministic.

use std::collections::{HashMap, HashSet};

use glam::IVec2;
use hecs::World;
use rand_chacha::ChaCha8Rng;

use snipes_core::components::{GridPos, Snipe, SnipeState};
use snipes_core::constants::SNIPE_MOVE_INTERVAL_TICKS;
use snipes_core::events::SimEvent;
use snipes_maze::WallGrid;

use snipes_ai::{evaluate, SnipeContext};

use crate::world_setup;

struct Intent {
    entity: hecs::Entity,
    id: u32,
    dir: IVec2,
    step: Option<IVec2>,
}

/// Run one tick of snipe motion.
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    grid: &WallGrid,
    player: IVec2,
    tick: u64,
    events: &mut Vec<SimEvent>,
) {
    // Cells a snipe may not enter: other live snipes and hive footprints.
    let mut blocked: HashSet<(i32, i32)> = world_setup::hive_footprint_cells(world, grid);
    for (_entity, (_snipe, state, pos)) in world.query::<(&Snipe, &SnipeState, &GridPos)>().iter()
    {
        if state.alive {
            blocked.insert((pos.cell.x, pos.cell.y));
        }
    }

    // Movers due this interval, in id order.
    let mut movers: Vec<(hecs::Entity, u32, IVec2, IVec2)> = world
        .query::<(&Snipe, &SnipeState, &GridPos)>()
        .iter()
        .filter(|(_, (_, state, _))| {
            state.alive && tick.saturating_sub(state.last_move_tick) >= SNIPE_MOVE_INTERVAL_TICKS
        })
        .map(|(entity, (_, state, pos))| (entity, state.id, pos.cell, state.dir))
        .collect();
    movers.sort_by_key(|&(_, id, ..)| id);

    // Phase 1: decide.
    let mut intents = Vec::with_capacity(movers.len());
    for (entity, id, cell, dir) in movers {
        let ctx = SnipeContext {
            cell,
            dir,
            player,
            grid,
            blocked: &blocked,
        };
        let update = evaluate(&ctx, rng);
        intents.push(Intent {
            entity,
            id,
            dir: update.dir,
            step: update.step,
        });
    }

    // Phase 2: snipes contending for the same cell bounce. Both reverse
    // heading and hold, rather than merging or stacking.
    let mut claims: HashMap<(i32, i32), u32> = HashMap::new();
    for intent in &intents {
        if let Some(step) = intent.step {
            *claims.entry((step.x, step.y)).or_default() += 1;
        }
    }
    for intent in &mut intents {
        let Some(step) = intent.step else { continue };
        if claims[&(step.x, step.y)] > 1 {
            intent.dir = -intent.dir;
            intent.step = None;
        }
    }

    // Phase 3: commit in id order.
    for intent in intents {
        let Ok(mut query) = world.query_one::<(&mut SnipeState, &mut GridPos)>(intent.entity)
        else {
            continue;
        };
        let Some((state, pos)) = query.get() else {
            continue;
        };
        state.last_move_tick = tick;
        state.dir = intent.dir;
        if let Some(next) = intent.step {
            pos.prev = pos.cell;
            pos.cell = next;
            events.push(SimEvent::SnipeMoved {
                id: intent.id,
                x: next.x,
                y: next.y,
                dir_x: intent.dir.x,
                dir_y: intent.dir.y,
            });
        }
    }
}
