//! Remote-state merge for network-follower mode.
//!
//! When the engine mirrors a remote authority, each inbound record
//! overwrites the matching local entity or spawns it. Everything is
//! validated here at the boundary; a malformed update is an error the
//! caller logs and drops, and the authoritative collections stay intact.

use glam::{DVec2, IVec2};
use hecs::World;
use thiserror::Error;

use snipes_core::commands::RemoteEntityState;
use snipes_core::components::{BulletState, FlightPath, GridPos, HiveState, SnipeState};
use snipes_core::constants::*;
use snipes_core::types::{cell_of, is_step_dir};
use snipes_maze::WallGrid;

use crate::world_setup;

/// Why a remote record was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum RemoteStateError {
    #[error("direction ({dx}, {dy}) is not a unit step")]
    BadDirection { dx: i32, dy: i32 },
    #[error("cell ({x}, {y}) is inside a wall")]
    WallCell { x: i32, y: i32 },
    #[error("hive footprint at ({x}, {y}) overlaps a wall")]
    BlockedFootprint { x: i32, y: i32 },
    #[error("hit counter {hits} exceeds the destroy threshold")]
    BadHitCount { hits: u8 },
    #[error("reserve counter {got} exceeds the per-variant maximum")]
    BadReserve { got: u32 },
    #[error("position ({x}, {y}) is not finite")]
    BadPosition { x: f64, y: f64 },
}

/// Apply one remote record. Ids are taken from the remote authority;
/// local id counters are bumped past them so locally spawned entities
/// never collide.
pub fn apply(
    world: &mut World,
    grid: &WallGrid,
    state: RemoteEntityState,
    tick: u64,
    next_bullet_id: &mut u32,
    next_snipe_id: &mut u32,
    next_hive_id: &mut u32,
) -> Result<(), RemoteStateError> {
    match state {
        RemoteEntityState::Snipe {
            id,
            x,
            y,
            dir_x,
            dir_y,
            variant,
            alive,
            hive_id,
        } => {
            // (0, 0) is legal only as the transient spawn heading.
            if !is_step_dir(dir_x, dir_y) && (dir_x, dir_y) != (0, 0) {
                return Err(RemoteStateError::BadDirection {
                    dx: dir_x,
                    dy: dir_y,
                });
            }
            let cell = grid.wrap(IVec2::new(x, y));
            if grid.is_wall_cell(cell) {
                return Err(RemoteStateError::WallCell { x, y });
            }
            let dir = IVec2::new(dir_x, dir_y);

            for (_entity, (state, pos)) in world.query_mut::<(&mut SnipeState, &mut GridPos)>() {
                if state.id != id {
                    continue;
                }
                state.variant = variant;
                state.dir = dir;
                state.alive = alive;
                state.hive_id = hive_id;
                pos.prev = pos.cell;
                pos.cell = cell;
                return Ok(());
            }
            if alive {
                world_setup::spawn_snipe(world, id, variant, hive_id, cell, dir, tick);
                *next_snipe_id = (*next_snipe_id).max(id + 1);
            }
            Ok(())
        }

        RemoteEntityState::Hive {
            id,
            x,
            y,
            hits,
            destroyed,
            remaining_a,
            remaining_b,
        } => {
            if hits > HIVE_HITS_TO_DESTROY {
                return Err(RemoteStateError::BadHitCount { hits });
            }
            for got in [remaining_a, remaining_b] {
                if got > HIVE_SNIPES_PER_VARIANT {
                    return Err(RemoteStateError::BadReserve { got });
                }
            }
            let cell = grid.wrap(IVec2::new(x, y));
            if !grid.footprint_open(cell, HIVE_FOOTPRINT) {
                return Err(RemoteStateError::BlockedFootprint { x, y });
            }

            let flash = flash_after_hits(hits);
            for (_entity, (state, pos)) in world.query_mut::<(&mut HiveState, &mut GridPos)>() {
                if state.id != id {
                    continue;
                }
                state.hits = hits;
                state.destroyed = destroyed;
                state.remaining_a = remaining_a;
                state.remaining_b = remaining_b;
                state.flash_interval_ms = flash;
                pos.prev = pos.cell;
                pos.cell = cell;
                return Ok(());
            }
            let entity = world_setup::spawn_hive_at(world, id, cell, tick + HIVE_SPAWN_INTERVAL_TICKS);
            *next_hive_id = (*next_hive_id).max(id + 1);
            if let Ok(mut state) = world.get::<&mut HiveState>(entity) {
                state.hits = hits;
                state.destroyed = destroyed;
                state.remaining_a = remaining_a;
                state.remaining_b = remaining_b;
                state.flash_interval_ms = flash;
            }
            Ok(())
        }

        RemoteEntityState::Bullet {
            id,
            owner,
            x,
            y,
            dir_x,
            dir_y,
            fired_tick,
        } => {
            if !is_step_dir(dir_x, dir_y) {
                return Err(RemoteStateError::BadDirection {
                    dx: dir_x,
                    dy: dir_y,
                });
            }
            if !x.is_finite() || !y.is_finite() {
                return Err(RemoteStateError::BadPosition { x, y });
            }
            let pos = grid.wrap_f(DVec2::new(x, y));
            if grid.is_wall_cell(cell_of(pos)) {
                return Err(RemoteStateError::WallCell {
                    x: cell_of(pos).x,
                    y: cell_of(pos).y,
                });
            }
            let dir = IVec2::new(dir_x, dir_y);
            // A clock skewed into the future would break expiry math.
            let fired_tick = fired_tick.min(tick);

            for (_entity, (state, path)) in
                world.query_mut::<(&mut BulletState, &mut FlightPath)>()
            {
                if state.id != id {
                    continue;
                }
                state.owner = owner;
                state.fired_tick = fired_tick;
                state.removed = None;
                path.prev = path.pos;
                path.pos = pos;
                path.vel = DVec2::new(dir.x as f64, dir.y as f64) * BULLET_SPEED;
                return Ok(());
            }
            world_setup::spawn_bullet(world, id, owner, pos, dir, fired_tick);
            *next_bullet_id = (*next_bullet_id).max(id + 1);
            Ok(())
        }
    }
}

/// Flash cadence after a number of hits: shrink by one third per hit,
/// floored.
fn flash_after_hits(hits: u8) -> u32 {
    let mut flash = HIVE_FLASH_START_MS;
    for _ in 0..hits {
        flash = (flash - flash / 3).max(HIVE_FLASH_FLOOR_MS);
    }
    flash
}
