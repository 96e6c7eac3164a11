//! Cleanup system: despawns entities the resolver marked as gone.
//!
//! Destroyed hives stay in the world as rubble; only consumed bullets
//! and dead snipes leave. Uses a pre-allocated buffer to avoid per-tick
//! allocation.

use hecs::{Entity, World};

use snipes_core::components::{BulletState, SnipeState};

pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, state) in world.query_mut::<&BulletState>() {
        if state.removed.is_some() {
            despawn_buffer.push(entity);
        }
    }

    for (entity, state) in world.query_mut::<&SnipeState>() {
        if !state.alive {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
