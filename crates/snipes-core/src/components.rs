//! ECS components for hecs entities.
//!
//! Components are plain data structs with no game logic.
//! Logic lives in systems, not components.

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use crate::enums::{BulletEndCause, SnipeVariant};

/// Marks an entity as a bullet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bullet;

/// Marks an entity as a snipe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Snipe;

/// Marks an entity as a hive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hive;

/// Bullet identity and lifetime bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletState {
    /// Unique bullet id.
    pub id: u32,
    /// Id of the player who fired it.
    pub owner: u32,
    /// Tick at which the bullet was fired (expiry reference).
    pub fired_tick: u64,
    /// Set when the bullet has been consumed or expired this tick.
    /// A marked bullet is inert; marking it again is a no-op.
    pub removed: Option<BulletEndCause>,
}

/// Continuous bullet kinematics. `prev` is the last position before this
/// tick's integration and stays valid for wall-bounce recovery and redraw.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlightPath {
    pub pos: DVec2,
    pub prev: DVec2,
    /// Unit step direction scaled by the bullet speed constant.
    pub vel: DVec2,
}

/// Snipe behavior state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnipeState {
    /// Unique snipe id.
    pub id: u32,
    pub variant: SnipeVariant,
    /// Current heading. Components in {-1, 0, 1}; (0, 0) only transiently
    /// at spawn before the first decision.
    pub dir: IVec2,
    /// Id of the hive that released this snipe.
    pub hive_id: u32,
    /// Cleared by the combat resolver; cleanup despawns dead snipes.
    pub alive: bool,
    /// Tick of the last movement decision (gates the 200 ms cadence).
    pub last_move_tick: u64,
}

/// Integer grid position with the previous cell kept for redraw.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridPos {
    pub cell: IVec2,
    pub prev: IVec2,
}

impl GridPos {
    pub fn at(cell: IVec2) -> Self {
        Self { cell, prev: cell }
    }
}

/// Hive spawner state machine. `cell` in the accompanying `GridPos` is the
/// top-left of the 2x2 footprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiveState {
    /// Unique hive id.
    pub id: u32,
    /// Bullet hits taken so far. Saturates at the destroy threshold.
    pub hits: u8,
    /// Terminal: a destroyed hive never spawns and ignores further hits.
    pub destroyed: bool,
    /// Unreleased variant-A snipes.
    pub remaining_a: u32,
    /// Unreleased variant-B snipes.
    pub remaining_b: u32,
    /// Display flash cadence; shrinks by one third per hit, floored.
    pub flash_interval_ms: u32,
    /// Tick at which the next spawn attempt is due.
    pub next_spawn_tick: u64,
}

impl HiveState {
    /// Total unreleased snipes still held by this hive.
    pub fn remaining(&self) -> u32 {
        self.remaining_a + self.remaining_b
    }
}
