//! Simulation engine — the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, processes inbound
//! commands, runs all systems in a fixed order, and produces
//! `GameStateSnapshot`s. The maze, the seed, and the hive destruction
//! policy are injected at construction; everything downstream is
//! deterministic per seed.

use std::collections::VecDeque;

use glam::{DVec2, IVec2};
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use snipes_core::commands::PlayerCommand;
use snipes_core::components::BulletState;
use snipes_core::constants::*;
use snipes_core::enums::{GamePhase, HiveDestructionPolicy};
use snipes_core::events::SimEvent;
use snipes_core::state::GameStateSnapshot;
use snipes_core::types::{is_step_dir, SimTime};
use snipes_maze::WallGrid;

use crate::systems;
use crate::world_setup;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
    /// What hive destruction does to already-released snipes.
    pub destruction_policy: HiveDestructionPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            destruction_policy: HiveDestructionPolicy::default(),
        }
    }
}

/// Player state consumed (not owned) by the core: input or the network
/// layer moves the player; the resolver only reads the footprint and
/// flags hits.
#[derive(Debug, Clone, Copy)]
pub struct PlayerState {
    /// Top-left of the player's 2x2 footprint.
    pub cell: IVec2,
    /// False between a hit and the external repositioning.
    pub alive: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            cell: IVec2::ZERO,
            alive: false,
        }
    }
}

/// Running score and lives, fed exclusively by resolver events.
#[derive(Debug, Clone, Copy)]
pub struct ScoreState {
    pub score: u64,
    pub lives: u32,
    pub snipes_killed: u32,
    pub hives_destroyed: u32,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            score: 0,
            lives: PLAYER_START_LIVES,
            snipes_killed: 0,
            hives_destroyed: 0,
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    grid: WallGrid,
    time: SimTime,
    phase: GamePhase,
    level: u32,
    time_scale: f64,
    destruction_policy: HiveDestructionPolicy,
    initials: String,
    rng: ChaCha8Rng,
    player: PlayerState,
    score: ScoreState,
    next_bullet_id: u32,
    next_snipe_id: u32,
    next_hive_id: u32,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<hecs::Entity>,
    events: Vec<SimEvent>,
}

impl SimulationEngine {
    /// Create a new simulation engine over the given maze.
    pub fn new(grid: WallGrid, config: SimConfig) -> Self {
        Self {
            world: World::new(),
            grid,
            time: SimTime::default(),
            phase: GamePhase::default(),
            level: 0,
            time_scale: config.time_scale,
            destruction_policy: config.destruction_policy,
            initials: String::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            player: PlayerState::default(),
            score: ScoreState::default(),
            next_bullet_id: 0,
            next_snipe_id: 0,
            next_hive_id: 0,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting
    /// snapshot, carrying this tick's outcome records.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems();
            self.time.advance();
            if self.score.lives == 0 {
                self.phase = GamePhase::GameOver;
            }
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build(
            &self.world,
            &self.time,
            self.phase,
            self.level,
            &self.initials,
            &self.score,
            &self.player,
            events,
        )
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get a read-only reference to the maze.
    pub fn grid(&self) -> &WallGrid {
        &self.grid
    }

    /// Get a read-only reference to the score state.
    #[cfg(test)]
    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    /// Get a read-only reference to the player state.
    #[cfg(test)]
    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    /// Force the engine into an active level without seeding hives
    /// (for tests that build scenarios by hand).
    #[cfg(test)]
    pub fn activate(&mut self) {
        self.phase = GamePhase::Active;
        self.level = 1;
    }

    /// Spawn a hive at a fixed cell with a deterministic spawn clock.
    #[cfg(test)]
    pub fn spawn_test_hive(&mut self, cell: IVec2) -> u32 {
        let id = self.next_hive_id;
        self.next_hive_id += 1;
        world_setup::spawn_hive_at(
            &mut self.world,
            id,
            self.grid.wrap(cell),
            self.time.tick + HIVE_SPAWN_INTERVAL_TICKS,
        );
        id
    }

    /// Spawn a snipe at a fixed cell with a fixed heading.
    #[cfg(test)]
    pub fn spawn_test_snipe(&mut self, cell: IVec2, dir: IVec2, hive_id: u32) -> u32 {
        let id = self.next_snipe_id;
        self.next_snipe_id += 1;
        world_setup::spawn_snipe(
            &mut self.world,
            id,
            snipes_core::enums::SnipeVariant::A,
            hive_id,
            self.grid.wrap(cell),
            dir,
            self.time.tick,
        );
        id
    }

    /// Spawn a bullet at a fixed cell with a fixed heading.
    #[cfg(test)]
    pub fn spawn_test_bullet(&mut self, cell: IVec2, dir: IVec2) -> u32 {
        let id = self.next_bullet_id;
        self.next_bullet_id += 1;
        let cell = self.grid.wrap(cell);
        world_setup::spawn_bullet(
            &mut self.world,
            id,
            0,
            DVec2::new(cell.x as f64, cell.y as f64),
            dir,
            self.time.tick,
        );
        id
    }

    /// Place the player directly (bypassing footprint validation).
    #[cfg(test)]
    pub fn set_player_cell(&mut self, cell: IVec2) {
        self.player = PlayerState {
            cell: self.grid.wrap(cell),
            alive: true,
        };
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command. Invalid commands are absorbed here and
    /// never reach the authoritative collections.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartLevel { level } => {
                self.start_level(level.max(1));
            }
            PlayerCommand::FireBullet { dir_x, dir_y, owner } => {
                self.fire_bullet(dir_x, dir_y, owner);
            }
            PlayerCommand::SetInitials { initials } => {
                self.initials = initials;
            }
            PlayerCommand::SetPlayerPosition { x, y } => {
                let cell = self.grid.wrap(IVec2::new(x, y));
                if self.grid.footprint_open(cell, PLAYER_FOOTPRINT) {
                    self.player = PlayerState { cell, alive: true };
                } else {
                    log::warn!("dropping player position ({x}, {y}): footprint hits a wall");
                }
            }
            PlayerCommand::ApplyRemoteState { state } => {
                match crate::remote::apply(
                    &mut self.world,
                    &self.grid,
                    state,
                    self.time.tick,
                    &mut self.next_bullet_id,
                    &mut self.next_snipe_id,
                    &mut self.next_hive_id,
                ) {
                    Ok(()) => {}
                    Err(err) => log::warn!("dropping invalid remote state: {err}"),
                }
            }
            PlayerCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, 4.0);
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
        }
    }

    /// Reset all entity collections and seed the given level.
    /// Happens between ticks, so no system ever sees a half-built world.
    fn start_level(&mut self, level: u32) {
        // A fresh game (from Idle or GameOver) starts score and lives over;
        // mid-game level changes keep them.
        if matches!(self.phase, GamePhase::Idle | GamePhase::GameOver) {
            self.score = ScoreState::default();
        }

        self.world = World::new();
        self.time = SimTime::default();
        self.level = level;

        let hive_count = hive_count_for_level(level);
        let placed = world_setup::spawn_hives(
            &mut self.world,
            &mut self.rng,
            &self.grid,
            hive_count,
            self.time.tick,
            &mut self.next_hive_id,
        );
        if placed < hive_count {
            log::warn!("placed only {placed} of {hive_count} hives on a crowded maze");
        }

        // Give the player a fresh site; the external owner may override it
        // with SetPlayerPosition at any time.
        if let Some(cell) =
            world_setup::player_start_site(&self.world, &mut self.rng, &self.grid)
        {
            self.player = PlayerState { cell, alive: true };
        }

        self.phase = GamePhase::Active;
        self.events.push(SimEvent::LevelStarted { level, hive_count });
    }

    /// Fire a bullet from the player's cell.
    fn fire_bullet(&mut self, dir_x: i32, dir_y: i32, owner: u32) {
        if self.phase != GamePhase::Active || !self.player.alive {
            return;
        }
        if !is_step_dir(dir_x, dir_y) {
            log::debug!("ignoring fire with non-step direction ({dir_x}, {dir_y})");
            return;
        }
        // Global cap, not per-player: excess fire commands are no-ops.
        if self.active_bullets() >= MAX_ACTIVE_BULLETS {
            log::debug!("bullet cap reached, fire ignored");
            return;
        }

        let id = self.next_bullet_id;
        self.next_bullet_id += 1;
        let origin = DVec2::new(self.player.cell.x as f64, self.player.cell.y as f64);
        let dir = IVec2::new(dir_x, dir_y);
        world_setup::spawn_bullet(&mut self.world, id, owner, origin, dir, self.time.tick);
        self.events.push(SimEvent::BulletFired {
            id,
            owner,
            x: origin.x,
            y: origin.y,
            dir_x,
            dir_y,
        });
    }

    /// Count bullets that are still in flight.
    fn active_bullets(&self) -> usize {
        self.world
            .query::<&BulletState>()
            .iter()
            .filter(|(_, state)| state.removed.is_none())
            .count()
    }

    /// Run all systems in order. Every cadence derives from the single
    /// tick counter, so mutation stays strictly serialized.
    fn run_systems(&mut self) {
        // 1. Hive spawning (slowest cadence, gated per hive)
        systems::hive_spawner::run(
            &mut self.world,
            &mut self.rng,
            &self.grid,
            self.time.tick,
            &mut self.next_snipe_id,
            &mut self.events,
        );
        // 2. Snipe decisions and movement (200 ms cadence, gated per snipe)
        systems::snipe_motion::run(
            &mut self.world,
            &mut self.rng,
            &self.grid,
            self.player.cell,
            self.time.tick,
            &mut self.events,
        );
        // 3. Bullet flight: integrate, bounce, expire (every tick)
        systems::bullets::run(&mut self.world, &self.grid, self.time.tick, &mut self.events);
        // 4. Combat resolution in fixed pass order
        systems::combat::run(
            &mut self.world,
            &self.grid,
            &mut self.player,
            &mut self.score,
            self.destruction_policy,
            &mut self.events,
        );
        // 5. Cleanup (consumed bullets, dead snipes)
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }
}
