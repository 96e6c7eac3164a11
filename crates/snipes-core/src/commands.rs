//! Player commands sent from input or the network layer to the simulation.
//!
//! Commands are validated and queued for processing at the next tick
//! boundary. Invalid commands are dropped at the boundary, never allowed
//! to corrupt the authoritative collections.

use serde::{Deserialize, Serialize};

use crate::enums::SnipeVariant;

/// All possible inbound actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Gameplay ---
    /// Fire a bullet from the player's cell. Silently rejected while the
    /// global active-bullet cap is reached.
    FireBullet { dir_x: i32, dir_y: i32, owner: u32 },
    /// Move the player (input/network owns movement; the core only
    /// consumes the position). Dropped if the footprint lands on a wall.
    SetPlayerPosition { x: i32, y: i32 },
    /// Reset all entity collections and seed hives for the given level.
    StartLevel { level: u32 },
    /// Player initials for display. Persistence lives upstream; the core
    /// treats the string as opaque and only echoes it in snapshots.
    SetInitials { initials: String },

    // --- Network follower ---
    /// Overwrite/merge one entity's state from a remote authority.
    ApplyRemoteState { state: RemoteEntityState },

    // --- Simulation control ---
    /// Set time scale (1.0 = normal, 2.0 = double, 0.0 = paused).
    SetTimeScale { scale: f64 },
    Pause,
    Resume,
}

/// One entity's state as mirrored from a remote simulation.
///
/// Field-level wire types are plain scalars so the format stays stable
/// regardless of internal math types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RemoteEntityState {
    Snipe {
        id: u32,
        x: i32,
        y: i32,
        dir_x: i32,
        dir_y: i32,
        variant: SnipeVariant,
        alive: bool,
        hive_id: u32,
    },
    Hive {
        id: u32,
        x: i32,
        y: i32,
        hits: u8,
        destroyed: bool,
        remaining_a: u32,
        remaining_b: u32,
    },
    Bullet {
        id: u32,
        owner: u32,
        x: f64,
        y: f64,
        dir_x: i32,
        dir_y: i32,
        fired_tick: u64,
    },
}
