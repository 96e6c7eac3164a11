//! Game state snapshot — the complete visible state produced each tick.

use serde::{Deserialize, Serialize};

use crate::enums::{GamePhase, SnipeVariant};
use crate::events::SimEvent;
use crate::types::SimTime;

/// Complete game state handed to downstream consumers after each tick.
/// Entity views are sorted by id so equal states serialize identically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub level: u32,
    /// Opaque display initials supplied from upstream configuration.
    pub initials: String,
    pub score: ScoreView,
    pub player: PlayerView,
    pub bullets: Vec<BulletView>,
    pub snipes: Vec<SnipeView>,
    pub hives: Vec<HiveView>,
    /// Outcome records of this tick, in emission order.
    pub events: Vec<SimEvent>,
}

/// Running score and lives.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreView {
    pub score: u64,
    pub lives: u32,
    pub snipes_killed: u32,
    pub hives_destroyed: u32,
}

/// Player position as consumed by the core.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    /// False between a hit and the external repositioning.
    pub alive: bool,
}

/// A bullet in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BulletView {
    pub id: u32,
    pub owner: u32,
    pub x: f64,
    pub y: f64,
    pub prev_x: f64,
    pub prev_y: f64,
    pub dir_x: i32,
    pub dir_y: i32,
}

/// A live snipe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SnipeView {
    pub id: u32,
    pub variant: SnipeVariant,
    pub x: i32,
    pub y: i32,
    pub prev_x: i32,
    pub prev_y: i32,
    pub dir_x: i32,
    pub dir_y: i32,
}

/// A hive (destroyed hives remain visible as rubble).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HiveView {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub hits: u8,
    pub destroyed: bool,
    pub remaining: u32,
    pub flash_interval_ms: u32,
}
