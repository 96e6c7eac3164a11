//! Hive spawner system — timed release of snipes.
//!
//! Each hive runs its own spawn clock. A due hive picks a variant from
//! its reserves, a free cell on the ring around its footprint, and a
//! random initial heading. Hives are visited in id order so RNG
//! consumption is deterministic.

use std::collections::HashSet;

use glam::IVec2;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use snipes_core::components::{GridPos, HiveState, Snipe, SnipeState};
use snipes_core::constants::{HIVE_FOOTPRINT, HIVE_SPAWN_INTERVAL_TICKS};
use snipes_core::enums::SnipeVariant;
use snipes_core::events::SimEvent;
use snipes_maze::WallGrid;

use crate::world_setup;
use snipes_ai::DIRECTIONS;

/// Check all spawn clocks and release due snipes.
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    grid: &WallGrid,
    tick: u64,
    next_snipe_id: &mut u32,
    events: &mut Vec<SimEvent>,
) {
    // Cells a newborn snipe may not share: live snipes and hive footprints.
    let mut occupied = world_setup::hive_footprint_cells(world, grid);
    for (_entity, (_snipe, state, pos)) in world.query::<(&Snipe, &SnipeState, &GridPos)>().iter()
    {
        if state.alive {
            occupied.insert((pos.cell.x, pos.cell.y));
        }
    }

    // Due hives in id order.
    let mut due: Vec<(hecs::Entity, u32, IVec2, u32, u32)> = world
        .query::<(&HiveState, &GridPos)>()
        .iter()
        .filter(|(_, (state, _))| {
            !state.destroyed && state.remaining() > 0 && tick >= state.next_spawn_tick
        })
        .map(|(entity, (state, pos))| {
            (entity, state.id, pos.cell, state.remaining_a, state.remaining_b)
        })
        .collect();
    due.sort_by_key(|&(_, id, ..)| id);

    for (entity, hive_id, cell, remaining_a, remaining_b) in due {
        let sites = ring_sites(grid, cell, &occupied);
        if sites.is_empty() {
            // Walled in; retry next interval.
            if let Ok(mut state) = world.get::<&mut HiveState>(entity) {
                state.next_spawn_tick =
                    tick + HIVE_SPAWN_INTERVAL_TICKS + world_setup::spawn_jitter(rng);
            }
            continue;
        }

        let variant = if remaining_a > 0 && remaining_b > 0 {
            if rng.gen_bool(0.5) {
                SnipeVariant::A
            } else {
                SnipeVariant::B
            }
        } else if remaining_a > 0 {
            SnipeVariant::A
        } else {
            SnipeVariant::B
        };
        let site = sites[rng.gen_range(0..sites.len())];
        let dir = DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())];

        if let Ok(mut state) = world.get::<&mut HiveState>(entity) {
            match variant {
                SnipeVariant::A => state.remaining_a -= 1,
                SnipeVariant::B => state.remaining_b -= 1,
            }
            state.next_spawn_tick =
                tick + HIVE_SPAWN_INTERVAL_TICKS + world_setup::spawn_jitter(rng);
        }

        let id = *next_snipe_id;
        *next_snipe_id += 1;
        world_setup::spawn_snipe(world, id, variant, hive_id, site, dir, tick);
        occupied.insert((site.x, site.y));

        events.push(SimEvent::SnipeSpawned {
            id,
            x: site.x,
            y: site.y,
            dir_x: dir.x,
            dir_y: dir.y,
            variant,
        });
    }
}

/// Free passable cells on the ring around a hive footprint.
fn ring_sites(grid: &WallGrid, top_left: IVec2, occupied: &HashSet<(i32, i32)>) -> Vec<IVec2> {
    let mut sites = Vec::new();
    for dy in -1..=HIVE_FOOTPRINT {
        for dx in -1..=HIVE_FOOTPRINT {
            let on_ring = dx == -1 || dy == -1 || dx == HIVE_FOOTPRINT || dy == HIVE_FOOTPRINT;
            if !on_ring {
                continue;
            }
            let cell = grid.wrap(top_left + IVec2::new(dx, dy));
            if !grid.is_wall_cell(cell) && !occupied.contains(&(cell.x, cell.y)) {
                sites.push(cell);
            }
        }
    }
    sites
}
