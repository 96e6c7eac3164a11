//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Snipe variant tag. Cosmetic and scoring-neutral; hives hold separate
/// reserves of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnipeVariant {
    A,
    B,
}

/// Why a snipe died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillCause {
    /// Shot by a bullet.
    Bullet,
    /// Walked into (or was walked into by) the player.
    PlayerCollision,
    /// Mass-killed when its hive was destroyed.
    HiveDestroyed,
}

/// Why a bullet left the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletEndCause {
    /// Lifetime ran out.
    Expired,
    /// Consumed by hitting a snipe.
    HitSnipe,
    /// Consumed by hitting a hive.
    HitHive,
}

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No level running yet.
    #[default]
    Idle,
    Active,
    Paused,
    /// Lives exhausted. A new `StartLevel` begins a fresh game.
    GameOver,
}

/// What a hive's destruction does to snipes it already released.
///
/// The conservative default kills only the unreleased reserve counters;
/// already-spawned snipes fight on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HiveDestructionPolicy {
    #[default]
    UnreleasedOnly,
    /// Also mass-kill live snipes that trace back to the destroyed hive.
    IncludeLiveSnipes,
}
