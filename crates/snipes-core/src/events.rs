//! Events emitted by the simulation for scoring, UI, and network mirrors.
//!
//! Each tick returns its outcome records as an explicit list inside the
//! snapshot; consumers (score display, renderer, pub/sub mirror) read them
//! fire-and-forget and can never stall the simulation.

use serde::{Deserialize, Serialize};

use crate::enums::{BulletEndCause, KillCause, SnipeVariant};

/// Outcome records of one simulation tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A level was (re)started.
    LevelStarted { level: u32, hive_count: u32 },
    /// A hive released a snipe.
    SnipeSpawned {
        id: u32,
        x: i32,
        y: i32,
        dir_x: i32,
        dir_y: i32,
        variant: SnipeVariant,
    },
    /// A snipe committed a move.
    SnipeMoved {
        id: u32,
        x: i32,
        y: i32,
        dir_x: i32,
        dir_y: i32,
    },
    /// A snipe died.
    SnipeKilled { id: u32, cause: KillCause },
    /// A hive took a bullet hit.
    HiveHit {
        id: u32,
        hits: u8,
        flash_interval_ms: u32,
    },
    /// A hive reached the hit threshold. `unreleased` is the reserve count
    /// at the moment of the final hit, for scoring.
    HiveDestroyed { id: u32, unreleased: u32 },
    /// A bullet entered the world.
    BulletFired {
        id: u32,
        owner: u32,
        x: f64,
        y: f64,
        dir_x: i32,
        dir_y: i32,
    },
    /// A bullet expired or was consumed by a collision.
    BulletRemoved { id: u32, cause: BulletEndCause },
    /// A snipe reached the player. One life lost; the external game-state
    /// owner must reposition the player to a fresh passable cell.
    PlayerHit { snipe_id: u32 },
}
