//! Entity spawn factories for seeding and populating the world.

use std::collections::HashSet;

use glam::{DVec2, IVec2};
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use snipes_core::components::*;
use snipes_core::constants::*;
use snipes_core::enums::SnipeVariant;
use snipes_maze::WallGrid;

/// Attempts before giving up on placing an entity on a crowded maze.
const MAX_PLACEMENT_ATTEMPTS: usize = 200;

/// Seed `count` hives at random non-overlapping open sites.
/// Returns how many were actually placed.
pub fn spawn_hives(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    grid: &WallGrid,
    count: u32,
    tick: u64,
    next_hive_id: &mut u32,
) -> u32 {
    let mut taken = hive_footprint_cells(world, grid);
    let mut placed = 0;

    for _ in 0..count {
        let Some(cell) = find_footprint_site(rng, grid, HIVE_FOOTPRINT, &taken) else {
            break;
        };
        let id = *next_hive_id;
        *next_hive_id += 1;
        spawn_hive_at(world, id, cell, tick + HIVE_SPAWN_INTERVAL_TICKS + spawn_jitter(rng));
        for dy in 0..HIVE_FOOTPRINT {
            for dx in 0..HIVE_FOOTPRINT {
                let c = grid.wrap(cell + IVec2::new(dx, dy));
                taken.insert((c.x, c.y));
            }
        }
        placed += 1;
    }
    placed
}

/// Spawn one hive with full reserves at a fixed cell.
pub fn spawn_hive_at(world: &mut World, id: u32, cell: IVec2, next_spawn_tick: u64) -> hecs::Entity {
    world.spawn((
        Hive,
        HiveState {
            id,
            hits: 0,
            destroyed: false,
            remaining_a: HIVE_SNIPES_PER_VARIANT,
            remaining_b: HIVE_SNIPES_PER_VARIANT,
            flash_interval_ms: HIVE_FLASH_START_MS,
            next_spawn_tick,
        },
        GridPos::at(cell),
    ))
}

/// Spawn one snipe.
pub fn spawn_snipe(
    world: &mut World,
    id: u32,
    variant: SnipeVariant,
    hive_id: u32,
    cell: IVec2,
    dir: IVec2,
    tick: u64,
) -> hecs::Entity {
    world.spawn((
        Snipe,
        SnipeState {
            id,
            variant,
            dir,
            hive_id,
            alive: true,
            last_move_tick: tick,
        },
        GridPos::at(cell),
    ))
}

/// Spawn one bullet. `dir` is a unit step; velocity is scaled by the
/// speed constant.
pub fn spawn_bullet(
    world: &mut World,
    id: u32,
    owner: u32,
    origin: DVec2,
    dir: IVec2,
    tick: u64,
) -> hecs::Entity {
    world.spawn((
        Bullet,
        BulletState {
            id,
            owner,
            fired_tick: tick,
            removed: None,
        },
        FlightPath {
            pos: origin,
            prev: origin,
            vel: DVec2::new(dir.x as f64, dir.y as f64) * BULLET_SPEED,
        },
    ))
}

/// A fresh open site for the player's footprint, clear of hives.
pub fn player_start_site(
    world: &World,
    rng: &mut ChaCha8Rng,
    grid: &WallGrid,
) -> Option<IVec2> {
    let taken = hive_footprint_cells(world, grid);
    find_footprint_site(rng, grid, PLAYER_FOOTPRINT, &taken)
}

/// Random open cell whose `size`x`size` footprint is passable and does not
/// overlap any taken cell.
fn find_footprint_site(
    rng: &mut ChaCha8Rng,
    grid: &WallGrid,
    size: i32,
    taken: &HashSet<(i32, i32)>,
) -> Option<IVec2> {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let cell = grid.random_open_cell(rng)?;
        if !grid.footprint_open(cell, size) {
            continue;
        }
        let overlaps = (0..size).any(|dy| {
            (0..size).any(|dx| {
                let c = grid.wrap(cell + IVec2::new(dx, dy));
                taken.contains(&(c.x, c.y))
            })
        });
        if !overlaps {
            return Some(cell);
        }
    }
    log::warn!("no open {size}x{size} site found after {MAX_PLACEMENT_ATTEMPTS} attempts");
    None
}

/// All wrapped cells covered by hive footprints (destroyed ones included;
/// rubble still blocks).
pub fn hive_footprint_cells(world: &World, grid: &WallGrid) -> HashSet<(i32, i32)> {
    let mut cells = HashSet::new();
    for (_entity, (_hive, pos)) in world.query::<(&Hive, &GridPos)>().iter() {
        for dy in 0..HIVE_FOOTPRINT {
            for dx in 0..HIVE_FOOTPRINT {
                let c = grid.wrap(pos.cell + IVec2::new(dx, dy));
                cells.insert((c.x, c.y));
            }
        }
    }
    cells
}

/// Jitter added to each spawn interval so hives drift out of phase.
pub fn spawn_jitter(rng: &mut ChaCha8Rng) -> u64 {
    rng.gen_range(0..=HIVE_SPAWN_JITTER_TICKS)
}
