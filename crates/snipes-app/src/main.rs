//! Headless SNIPES driver.
//!
//! Runs the simulation in real time, patrols the player through the demo
//! maze, fires along the patrol heading, and handles the respawn contract
//! after a hit. Rendering and input capture are external concerns; this
//! binary stands in for them with structured logging.

mod game_loop;
mod state;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use snipes_core::commands::PlayerCommand;
use snipes_core::constants::PLAYER_FOOTPRINT;
use snipes_core::enums::GamePhase;
use snipes_maze::WallGrid;
use snipes_sim::engine::SimConfig;

use crate::game_loop::spawn_game_loop;
use crate::state::{GameLoopCommand, SharedSnapshot};

/// How long the demo runs before shutting down.
const DEMO_STEPS: u32 = 300;

/// Driver cadence: one player action per 100 ms.
const STEP_INTERVAL: Duration = Duration::from_millis(100);

/// Patrol headings, tried clockwise when blocked.
const PATROL_DIRS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

fn main() {
    env_logger::init();

    let grid = demo_maze();
    let latest: SharedSnapshot = Arc::new(Mutex::new(None));
    let (tx, handle) = spawn_game_loop(grid.clone(), SimConfig::default(), Arc::clone(&latest));

    let _ = tx.send(GameLoopCommand::PlayerCommand(PlayerCommand::StartLevel {
        level: 1,
    }));

    let mut heading = 0usize;
    for step in 0..DEMO_STEPS {
        std::thread::sleep(STEP_INTERVAL);

        let snapshot = latest.lock().ok().and_then(|slot| slot.clone());
        let Some(snapshot) = snapshot else { continue };

        if snapshot.phase == GamePhase::GameOver {
            log::info!("game over at score {}", snapshot.score.score);
            break;
        }

        if !snapshot.player.alive {
            // The core only signals the hit; repositioning is ours.
            if let Some(cell) = respawn_site(&grid) {
                let _ = tx.send(GameLoopCommand::PlayerCommand(
                    PlayerCommand::SetPlayerPosition {
                        x: cell.0,
                        y: cell.1,
                    },
                ));
            }
            continue;
        }

        // Patrol: step along the heading, turning clockwise at walls.
        let here = glam::IVec2::new(snapshot.player.x, snapshot.player.y);
        for _ in 0..PATROL_DIRS.len() {
            let (dx, dy) = PATROL_DIRS[heading];
            let next = grid.wrap(here + glam::IVec2::new(dx, dy));
            if grid.footprint_open(next, PLAYER_FOOTPRINT) {
                let _ = tx.send(GameLoopCommand::PlayerCommand(
                    PlayerCommand::SetPlayerPosition {
                        x: next.x,
                        y: next.y,
                    },
                ));
                break;
            }
            heading = (heading + 1) % PATROL_DIRS.len();
        }

        if step % 5 == 0 {
            let (dx, dy) = PATROL_DIRS[heading];
            let _ = tx.send(GameLoopCommand::PlayerCommand(PlayerCommand::FireBullet {
                dir_x: dx,
                dir_y: dy,
                owner: 0,
            }));
        }

        if step % 20 == 0 {
            log::info!(
                "score {} lives {} snipes {} hives left {}",
                snapshot.score.score,
                snapshot.score.lives,
                snapshot.snipes.len(),
                snapshot.hives.iter().filter(|h| !h.destroyed).count()
            );
        }
    }

    let _ = tx.send(GameLoopCommand::Shutdown);
    let _ = handle.join();

    if let Ok(slot) = latest.lock() {
        if let Some(snapshot) = slot.as_ref() {
            log::info!("final score: {}", snapshot.score.score);
        }
    };
}

/// First open player-sized site, scanning row-major. Deterministic on
/// purpose: the respawn policy belongs to the driver, not the core.
fn respawn_site(grid: &WallGrid) -> Option<(i32, i32)> {
    grid.open_cells()
        .iter()
        .find(|&&cell| grid.footprint_open(cell, PLAYER_FOOTPRINT))
        .map(|cell| (cell.x, cell.y))
}

/// Bordered demo maze: vertical wall ribs with regular gaps.
fn demo_maze() -> WallGrid {
    let (width, height) = (48, 24);
    let mut rows: Vec<String> = Vec::new();
    for y in 0..height {
        let mut row = String::new();
        for x in 0..width {
            let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
            let rib = x % 6 == 3 && y % 4 != 1;
            row.push(if border || rib { '#' } else { '.' });
        }
        rows.push(row);
    }
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    WallGrid::from_rows(&refs).expect("demo maze is well-formed")
}
