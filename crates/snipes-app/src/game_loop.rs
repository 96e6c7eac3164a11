//! Game loop thread — runs the simulation engine at the bullet cadence
//! and publishes snapshots.
//!
//! The engine is created inside this thread because it's cleaner for
//! ownership. Commands arrive via `mpsc` channel. Snapshots land in the
//! shared slot for synchronous polling, and each tick's events go to the
//! log; both are fire-and-forget so consumers never throttle the tick.

use std::sync::mpsc;
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use snipes_core::constants::TICK_RATE;
use snipes_core::events::SimEvent;
use snipes_maze::WallGrid;
use snipes_sim::engine::{SimConfig, SimulationEngine};

use crate::state::{GameLoopCommand, SharedSnapshot};

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Spawns the game loop in a new thread.
///
/// Returns the command sender for the driver to use, plus the join handle
/// for a clean shutdown.
pub fn spawn_game_loop(
    grid: WallGrid,
    config: SimConfig,
    latest_snapshot: SharedSnapshot,
) -> (mpsc::Sender<GameLoopCommand>, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("snipes-game-loop".into())
        .spawn(move || {
            run_game_loop(grid, config, cmd_rx, &latest_snapshot);
        })
        .expect("Failed to spawn game loop thread");

    (cmd_tx, handle)
}

/// The game loop. Runs until Shutdown command or channel disconnect.
fn run_game_loop(
    grid: WallGrid,
    config: SimConfig,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<snipes_core::state::GameStateSnapshot>>,
) {
    let mut engine = SimulationEngine::new(grid, config);
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => {
                    engine.queue_command(cmd);
                }
                Ok(GameLoopCommand::Shutdown) => return,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        // 2. Advance one tick (engine handles pause semantics internally)
        let snapshot = engine.tick();

        // 3. Report this tick's outcome records
        for event in &snapshot.events {
            log_event(event);
        }

        // 4. Store latest snapshot for synchronous polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 5. Sleep until next tick, adjusting for time_scale
        let time_scale = engine.time_scale();
        let effective_tick_duration = if time_scale > 0.001 {
            TICK_DURATION.div_f64(time_scale)
        } else {
            TICK_DURATION
        };

        next_tick_time += effective_tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > effective_tick_duration * 2 {
            // Too far behind — reset to avoid catch-up spiral
            next_tick_time = now;
        }
    }
}

/// Route an event to the log at a level matching its weight.
fn log_event(event: &SimEvent) {
    match event {
        SimEvent::LevelStarted { level, hive_count } => {
            log::info!("level {level} started with {hive_count} hives");
        }
        SimEvent::HiveDestroyed { id, unreleased } => {
            log::info!("hive {id} destroyed, {unreleased} snipes never released");
        }
        SimEvent::PlayerHit { snipe_id } => {
            log::info!("player hit by snipe {snipe_id}");
        }
        SimEvent::SnipeKilled { id, cause } => {
            log::debug!("snipe {id} killed ({cause:?})");
        }
        SimEvent::HiveHit { id, hits, .. } => {
            log::debug!("hive {id} hit ({hits} total)");
        }
        _ => log::trace!("{event:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_duration_constant() {
        // 100Hz = 10ms per tick
        let expected_nanos = 1_000_000_000u64 / 100;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }
}
