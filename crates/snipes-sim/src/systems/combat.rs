//! Combat resolver — cross-entity hit testing and the resulting state
//! transitions and score deltas.
//!
//! Invoked once per tick after every entity-moving system, with fixed
//! pass order: bullet vs hive, bullet vs snipe, hive-destruction scoring,
//! snipe vs player. The order guarantees that within one tick a bullet
//! cannot also save a snipe from a destruction mass-kill, and a hive
//! cannot be destroyed and independently shot twice. Sets are walked in
//! id order so ties resolve reproducibly.

use glam::IVec2;
use hecs::World;

use snipes_core::components::{BulletState, FlightPath, GridPos, HiveState, SnipeState};
use snipes_core::constants::*;
use snipes_core::enums::{BulletEndCause, HiveDestructionPolicy, KillCause};
use snipes_core::events::SimEvent;
use snipes_core::types::cell_of;
use snipes_maze::WallGrid;

use crate::engine::{PlayerState, ScoreState};

/// Run the resolver over the authoritative entity sets.
pub fn run(
    world: &mut World,
    grid: &WallGrid,
    player: &mut PlayerState,
    score: &mut ScoreState,
    policy: HiveDestructionPolicy,
    events: &mut Vec<SimEvent>,
) {
    // Collect the tick's authoritative view once; all passes share it.
    let mut bullets: Vec<(hecs::Entity, u32, IVec2, IVec2)> = world
        .query::<(&BulletState, &FlightPath)>()
        .iter()
        .filter(|(_, (state, _))| state.removed.is_none())
        .map(|(entity, (state, path))| {
            (
                entity,
                state.id,
                grid.wrap(cell_of(path.pos)),
                grid.wrap(cell_of(path.prev)),
            )
        })
        .collect();
    bullets.sort_by_key(|&(_, id, ..)| id);

    let mut hives: Vec<(hecs::Entity, u32, IVec2)> = world
        .query::<(&HiveState, &GridPos)>()
        .iter()
        .filter(|(_, (state, _))| !state.destroyed)
        .map(|(entity, (state, pos))| (entity, state.id, pos.cell))
        .collect();
    hives.sort_by_key(|&(_, id, _)| id);

    let mut snipes: Vec<(hecs::Entity, u32, IVec2, IVec2, u32)> = world
        .query::<(&SnipeState, &GridPos)>()
        .iter()
        .filter(|(_, (state, _))| state.alive)
        .map(|(entity, (state, pos))| {
            (
                entity,
                state.id,
                pos.cell,
                grid.wrap(pos.cell + state.dir),
                state.hive_id,
            )
        })
        .collect();
    snipes.sort_by_key(|&(_, id, ..)| id);

    let mut bullet_used = vec![false; bullets.len()];
    let mut snipe_dead = vec![false; snipes.len()];
    // (entity, id, unreleased-at-destruction)
    let mut destroyed_this_tick: Vec<(hecs::Entity, u32, u32)> = Vec::new();

    // --- Pass 1: bullet vs hive ---
    for (bi, &(bullet_entity, bullet_id, cell, prev)) in bullets.iter().enumerate() {
        for &(hive_entity, hive_id, hive_cell) in &hives {
            let hit = in_footprint(grid, hive_cell, HIVE_FOOTPRINT, cell)
                || in_footprint(grid, hive_cell, HIVE_FOOTPRINT, prev);
            if !hit {
                continue;
            }

            bullet_used[bi] = true;
            remove_bullet(world, bullet_entity, bullet_id, BulletEndCause::HitHive, events);

            if let Ok(mut state) = world.get::<&mut HiveState>(hive_entity) {
                // Destroyed hives ignore further hits; the bullet is
                // still spent on the footprint.
                if !state.destroyed {
                    state.hits = (state.hits + 1).min(HIVE_HITS_TO_DESTROY);
                    state.flash_interval_ms = (state.flash_interval_ms
                        - state.flash_interval_ms / 3)
                        .max(HIVE_FLASH_FLOOR_MS);
                    events.push(SimEvent::HiveHit {
                        id: hive_id,
                        hits: state.hits,
                        flash_interval_ms: state.flash_interval_ms,
                    });
                    if state.hits >= HIVE_HITS_TO_DESTROY {
                        state.destroyed = true;
                        destroyed_this_tick.push((hive_entity, hive_id, state.remaining()));
                    }
                }
            }
            // First matching hive only, by id order.
            break;
        }
    }

    // --- Pass 2: bullet vs snipe (order-independent overlap test) ---
    for (bi, &(bullet_entity, bullet_id, cell, _prev)) in bullets.iter().enumerate() {
        if bullet_used[bi] {
            continue;
        }
        for (si, &(snipe_entity, snipe_id, body, arrow, _)) in snipes.iter().enumerate() {
            if snipe_dead[si] {
                continue;
            }
            if cell != body && cell != arrow {
                continue;
            }

            bullet_used[bi] = true;
            snipe_dead[si] = true;
            remove_bullet(world, bullet_entity, bullet_id, BulletEndCause::HitSnipe, events);
            kill_snipe(world, snipe_entity, snipe_id, KillCause::Bullet, events);
            score.score += SCORE_SNIPE_KILL;
            score.snipes_killed += 1;
            break;
        }
    }

    // --- Pass 3: hives destroyed this tick ---
    for &(hive_entity, hive_id, unreleased) in &destroyed_this_tick {
        events.push(SimEvent::HiveDestroyed {
            id: hive_id,
            unreleased,
        });
        score.score += SCORE_HIVE_DESTROYED + SCORE_UNRELEASED_SNIPE * unreleased as u64;
        score.hives_destroyed += 1;

        if let Ok(mut state) = world.get::<&mut HiveState>(hive_entity) {
            state.remaining_a = 0;
            state.remaining_b = 0;
        }

        if policy == HiveDestructionPolicy::IncludeLiveSnipes {
            for (si, &(snipe_entity, snipe_id, _, _, owner_hive)) in snipes.iter().enumerate() {
                if snipe_dead[si] || owner_hive != hive_id {
                    continue;
                }
                snipe_dead[si] = true;
                kill_snipe(world, snipe_entity, snipe_id, KillCause::HiveDestroyed, events);
            }
        }
    }

    // --- Pass 4: snipe vs player ---
    if player.alive {
        for (si, &(snipe_entity, snipe_id, body, _arrow, _)) in snipes.iter().enumerate() {
            if snipe_dead[si] {
                continue;
            }
            if !in_footprint(grid, player.cell, PLAYER_FOOTPRINT, body) {
                continue;
            }

            snipe_dead[si] = true;
            kill_snipe(world, snipe_entity, snipe_id, KillCause::PlayerCollision, events);
            score.lives = score.lives.saturating_sub(1);
            // The external game-state owner repositions the player to a
            // fresh passable cell and revives via SetPlayerPosition.
            player.alive = false;
            events.push(SimEvent::PlayerHit { snipe_id });
            // Exactly one life decrement and one snipe death per tick.
            break;
        }
    }
}

/// Is `cell` inside the `size`x`size` footprint anchored at `top_left`?
/// All comparisons on wrapped coordinates.
fn in_footprint(grid: &WallGrid, top_left: IVec2, size: i32, cell: IVec2) -> bool {
    let cell = grid.wrap(cell);
    (0..size).any(|dy| (0..size).any(|dx| grid.wrap(top_left + IVec2::new(dx, dy)) == cell))
}

/// Mark a bullet consumed. Already-marked bullets are left untouched, so
/// same-tick double removal is an idempotent no-op.
fn remove_bullet(
    world: &mut World,
    entity: hecs::Entity,
    id: u32,
    cause: BulletEndCause,
    events: &mut Vec<SimEvent>,
) {
    if let Ok(mut state) = world.get::<&mut BulletState>(entity) {
        if state.removed.is_none() {
            state.removed = Some(cause);
            events.push(SimEvent::BulletRemoved { id, cause });
        }
    }
}

/// Mark a snipe dead. Already-dead snipes are left untouched.
fn kill_snipe(
    world: &mut World,
    entity: hecs::Entity,
    id: u32,
    cause: KillCause,
    events: &mut Vec<SimEvent>,
) {
    if let Ok(mut state) = world.get::<&mut SnipeState>(entity) {
        if state.alive {
            state.alive = false;
            events.push(SimEvent::SnipeKilled { id, cause });
        }
    }
}
