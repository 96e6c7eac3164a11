//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz). One tick is the bullet cadence (10 ms);
/// snipe and hive cadences are multiples of it.
pub const TICK_RATE: u32 = 100;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Milliseconds per tick.
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

// --- Bullets ---

/// Global cap on simultaneously active bullets. Fire commands beyond the
/// cap are rejected as silent no-ops.
pub const MAX_ACTIVE_BULLETS: usize = 10;

/// Bullet speed in cells per tick. Velocity is a unit step direction
/// scaled by this.
pub const BULLET_SPEED: f64 = 1.0;

/// Bullet time-to-live in seconds.
pub const BULLET_LIFETIME_SECS: f64 = 2.0;

/// Bullet time-to-live in ticks.
pub const BULLET_LIFETIME_TICKS: u64 = (BULLET_LIFETIME_SECS * TICK_RATE as f64) as u64;

// --- Snipes ---

/// Interval between snipe decisions/moves (milliseconds).
pub const SNIPE_MOVE_INTERVAL_MS: u64 = 200;

/// Interval between snipe decisions/moves (ticks).
pub const SNIPE_MOVE_INTERVAL_TICKS: u64 = SNIPE_MOVE_INTERVAL_MS / TICK_MS;

/// Maximum Chebyshev distance at which a snipe is attracted to the player.
/// Beyond it, movement is purely persistence + random redirects.
pub const HEAT_RADIUS: i32 = 20;

// --- Hives ---

/// Hive footprint edge length in cells (hives occupy 2x2).
pub const HIVE_FOOTPRINT: i32 = 2;

/// Unreleased snipes of each variant a fresh hive holds.
pub const HIVE_SNIPES_PER_VARIANT: u32 = 10;

/// Bullet hits required to destroy a hive.
pub const HIVE_HITS_TO_DESTROY: u8 = 3;

/// Base interval between hive spawns (milliseconds).
pub const HIVE_SPAWN_INTERVAL_MS: u64 = 3000;

/// Base interval between hive spawns (ticks).
pub const HIVE_SPAWN_INTERVAL_TICKS: u64 = HIVE_SPAWN_INTERVAL_MS / TICK_MS;

/// Maximum jitter applied on top of the base spawn interval (ticks).
pub const HIVE_SPAWN_JITTER_TICKS: u64 = 30;

/// Flash interval of an undamaged hive (milliseconds).
pub const HIVE_FLASH_START_MS: u32 = 75;

/// Flash interval floor (milliseconds). Each hit shrinks the interval by
/// one third, saturating here.
pub const HIVE_FLASH_FLOOR_MS: u32 = 10;

// --- Player ---

/// Player footprint edge length in cells.
pub const PLAYER_FOOTPRINT: i32 = 2;

/// Lives at the start of a new game.
pub const PLAYER_START_LIVES: u32 = 3;

// --- Scoring ---

/// Points for shooting a spawned snipe.
pub const SCORE_SNIPE_KILL: u64 = 25;

/// Points for destroying a hive.
pub const SCORE_HIVE_DESTROYED: u64 = 500;

/// Points per unreleased snipe still held by a hive when it is destroyed.
pub const SCORE_UNRELEASED_SNIPE: u64 = 25;

// --- Levels ---

/// Hives on level 1.
pub const BASE_HIVE_COUNT: u32 = 5;

/// One extra hive every this many levels.
pub const LEVELS_PER_EXTRA_HIVE: u32 = 5;

/// Number of hives seeded for a level: 5 + (level - 1) / 5.
pub const fn hive_count_for_level(level: u32) -> u32 {
    BASE_HIVE_COUNT + level.saturating_sub(1) / LEVELS_PER_EXTRA_HIVE
}
