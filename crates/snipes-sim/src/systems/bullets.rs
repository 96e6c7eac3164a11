//! Bullet flight system — integration, wall bounce, expiry.
//!
//! Runs every tick (the fastest cadence). Collisions with snipes and
//! hives are adjudicated by the combat resolver, never here.

use hecs::World;

use snipes_core::components::{BulletState, FlightPath};
use snipes_core::constants::BULLET_LIFETIME_TICKS;
use snipes_core::enums::BulletEndCause;
use snipes_core::events::SimEvent;
use snipes_core::types::cell_of;
use snipes_maze::WallGrid;

/// Sign of a velocity component as a cell step.
pub(crate) fn step_sign(v: f64) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Advance every active bullet by one tick.
pub fn run(world: &mut World, grid: &WallGrid, tick: u64, events: &mut Vec<SimEvent>) {
    for (_entity, (state, path)) in world.query_mut::<(&mut BulletState, &mut FlightPath)>() {
        if state.removed.is_some() {
            continue;
        }

        // Lifetime expiry comes first; an expired bullet does not move.
        if tick.saturating_sub(state.fired_tick) > BULLET_LIFETIME_TICKS {
            state.removed = Some(BulletEndCause::Expired);
            events.push(SimEvent::BulletRemoved {
                id: state.id,
                cause: BulletEndCause::Expired,
            });
            continue;
        }

        path.prev = path.pos;
        path.pos = grid.wrap_f(path.pos + path.vel);

        if grid.is_wall_cell(cell_of(path.pos)) {
            // Reflect off the wall using the neighbors of the last valid
            // cell, then reposition there so the bullet cannot tunnel
            // through on the same tick.
            let pc = cell_of(path.prev);
            let sx = step_sign(path.vel.x);
            let sy = step_sign(path.vel.y);
            let horizontal_wall = grid.is_wall(pc.x + sx, pc.y);
            let vertical_wall = grid.is_wall(pc.x, pc.y + sy);

            if horizontal_wall && !vertical_wall {
                path.vel.x = -path.vel.x;
            } else if vertical_wall && !horizontal_wall {
                path.vel.y = -path.vel.y;
            } else {
                // Corner: reverse the full approach direction.
                path.vel = -path.vel;
            }
            path.pos = path.prev;
        }
    }
}
