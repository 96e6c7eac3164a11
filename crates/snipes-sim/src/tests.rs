//! Tests for the simulation engine: bullet flight, snipe motion, hive
//! lifecycle, combat resolution, and the command/event boundary.

use glam::IVec2;

use snipes_core::commands::{PlayerCommand, RemoteEntityState};
use snipes_core::constants::*;
use snipes_core::enums::*;
use snipes_core::events::SimEvent;
use snipes_core::state::GameStateSnapshot;
use snipes_maze::WallGrid;

use crate::engine::{SimConfig, SimulationEngine};

/// 64x64 open arena with a wall border.
fn open_arena() -> WallGrid {
    let mut rows: Vec<String> = Vec::new();
    rows.push("#".repeat(64));
    for _ in 0..62 {
        rows.push(format!("#{}#", ".".repeat(62)));
    }
    rows.push("#".repeat(64));
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    WallGrid::from_rows(&refs).unwrap()
}

/// Fully open n x n torus (no walls at all), for pure wrap arithmetic.
fn open_torus(n: usize) -> WallGrid {
    let rows: Vec<String> = (0..n).map(|_| ".".repeat(n)).collect();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    WallGrid::from_rows(&refs).unwrap()
}

/// 32x32 bordered maze with interior pillars every fourth cell.
fn pillar_maze() -> WallGrid {
    let mut rows: Vec<String> = Vec::new();
    for y in 0..32 {
        let mut row = String::new();
        for x in 0..32 {
            let border = x == 0 || y == 0 || x == 31 || y == 31;
            let pillar = x % 4 == 0 && y % 4 == 0;
            row.push(if border || pillar { '#' } else { '.' });
        }
        rows.push(row);
    }
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    WallGrid::from_rows(&refs).unwrap()
}

fn engine_on(grid: WallGrid) -> SimulationEngine {
    SimulationEngine::new(grid, SimConfig::default())
}

fn fire_east() -> PlayerCommand {
    PlayerCommand::FireBullet {
        dir_x: 1,
        dir_y: 0,
        owner: 0,
    }
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let make = || {
        SimulationEngine::new(
            pillar_maze(),
            SimConfig {
                seed: 12345,
                ..Default::default()
            },
        )
    };
    let mut engine_a = make();
    let mut engine_b = make();

    engine_a.queue_command(PlayerCommand::StartLevel { level: 1 });
    engine_b.queue_command(PlayerCommand::StartLevel { level: 1 });

    for i in 0..600 {
        if i % 50 == 0 {
            engine_a.queue_command(fire_east());
            engine_b.queue_command(fire_east());
        }
        let snap_a = engine_a.tick();
        let snap_b = engine_b.tick();

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "snapshots diverged with same seed at tick {i}");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = SimulationEngine::new(
        pillar_maze(),
        SimConfig {
            seed: 111,
            ..Default::default()
        },
    );
    let mut engine_b = SimulationEngine::new(
        pillar_maze(),
        SimConfig {
            seed: 222,
            ..Default::default()
        },
    );

    engine_a.queue_command(PlayerCommand::StartLevel { level: 1 });
    engine_b.queue_command(PlayerCommand::StartLevel { level: 1 });

    // Hive placement is seeded, so the first snapshots already differ.
    let mut diverged = false;
    for _ in 0..50 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "different seeds should produce divergent output");
}

// ---- Bullet flight ----

#[test]
fn test_bullet_linear_motion_with_wrap() {
    let mut engine = engine_on(open_torus(8));
    engine.activate();
    engine.set_player_cell(IVec2::new(0, 0));
    engine.spawn_test_bullet(IVec2::new(2, 3), IVec2::new(1, 0));

    // Position after N unobstructed ticks = origin + N * velocity (mod wrap).
    for n in 1..=20i64 {
        let snap = engine.tick();
        assert_eq!(snap.bullets.len(), 1);
        let expected_x = ((2 + n) % 8) as f64;
        assert!(
            (snap.bullets[0].x - expected_x).abs() < 1e-9,
            "tick {n}: expected x={expected_x}, got {}",
            snap.bullets[0].x
        );
        assert!((snap.bullets[0].y - 3.0).abs() < 1e-9);
    }
}

#[test]
fn test_bullet_expires_after_lifetime() {
    let mut engine = engine_on(open_torus(8));
    engine.activate();
    engine.set_player_cell(IVec2::new(0, 0));
    engine.spawn_test_bullet(IVec2::new(1, 1), IVec2::new(0, 1));

    // Age is checked against the pre-advance tick counter: the bullet is
    // alive through age 200 and removed on the next tick.
    let mut snap = GameStateSnapshot::default();
    for _ in 0..201 {
        snap = engine.tick();
    }
    assert_eq!(snap.bullets.len(), 1, "bullet should survive a full 2.0s");

    let snap = engine.tick();
    assert!(snap.bullets.is_empty(), "bullet should expire after 2.0s");
    assert!(snap.events.iter().any(|e| matches!(
        e,
        SimEvent::BulletRemoved {
            cause: BulletEndCause::Expired,
            ..
        }
    )));
}

#[test]
fn test_bullet_bounces_off_vertical_wall_reversing_x() {
    let grid = WallGrid::from_rows(&[
        "#####", //
        "#...#", //
        "#####",
    ])
    .unwrap();
    let mut engine = engine_on(grid);
    engine.activate();
    engine.set_player_cell(IVec2::new(1, 1));
    engine.spawn_test_bullet(IVec2::new(1, 1), IVec2::new(1, 0));

    let snap = engine.tick();
    assert!((snap.bullets[0].x - 2.0).abs() < 1e-9);
    let snap = engine.tick();
    assert!((snap.bullets[0].x - 3.0).abs() < 1e-9);

    // Next step would enter the wall at x=4: x velocity reverses and the
    // bullet is repositioned to the last valid cell.
    let snap = engine.tick();
    assert!((snap.bullets[0].x - 3.0).abs() < 1e-9);
    assert_eq!(snap.bullets[0].dir_x, -1);
    assert_eq!(snap.bullets[0].dir_y, 0);

    let snap = engine.tick();
    assert!((snap.bullets[0].x - 2.0).abs() < 1e-9);
    assert!((snap.bullets[0].y - 1.0).abs() < 1e-9);
}

#[test]
fn test_bullet_corner_bounce_reverses_both_axes() {
    let grid = WallGrid::from_rows(&[
        "####", //
        "#..#", //
        "#..#", //
        "####",
    ])
    .unwrap();
    let mut engine = engine_on(grid);
    engine.activate();
    engine.set_player_cell(IVec2::new(1, 1));
    engine.spawn_test_bullet(IVec2::new(1, 1), IVec2::new(1, 1));

    let snap = engine.tick();
    assert!((snap.bullets[0].x - 2.0).abs() < 1e-9);
    assert!((snap.bullets[0].y - 2.0).abs() < 1e-9);

    // (3, 3) is the corner: both components reverse.
    let snap = engine.tick();
    assert!((snap.bullets[0].x - 2.0).abs() < 1e-9);
    assert!((snap.bullets[0].y - 2.0).abs() < 1e-9);
    assert_eq!(snap.bullets[0].dir_x, -1);
    assert_eq!(snap.bullets[0].dir_y, -1);

    let snap = engine.tick();
    assert!((snap.bullets[0].x - 1.0).abs() < 1e-9);
    assert!((snap.bullets[0].y - 1.0).abs() < 1e-9);
}

#[test]
fn test_bounces_conserve_speed() {
    let grid = WallGrid::from_rows(&[
        "######", //
        "#....#", //
        "#....#", //
        "#....#", //
        "######",
    ])
    .unwrap();
    let check = grid.clone();
    let mut engine = engine_on(grid);
    engine.activate();
    engine.set_player_cell(IVec2::new(1, 1));
    engine.spawn_test_bullet(IVec2::new(2, 2), IVec2::new(1, 1));

    // Diagonal bullet rattling around a small box: velocity magnitude is
    // conserved across any number of bounces and the bullet never rests
    // inside a wall.
    for _ in 0..100 {
        let snap = engine.tick();
        assert_eq!(snap.bullets.len(), 1);
        let b = &snap.bullets[0];
        assert_eq!(b.dir_x.abs(), 1);
        assert_eq!(b.dir_y.abs(), 1);
        assert!(!check.is_wall(b.x.floor() as i32, b.y.floor() as i32));
    }
}

// ---- Snipe motion ----

#[test]
fn test_snipe_direction_persistence_in_open_space() {
    let mut engine = engine_on(open_arena());
    engine.activate();
    engine.set_player_cell(IVec2::new(1, 1)); // out of heat range
    engine.spawn_test_snipe(IVec2::new(34, 34), IVec2::new(1, 0), 0);

    // Five full move intervals with nothing in the way: the heading never
    // changes and the snipe advances one cell per interval.
    let mut snap = GameStateSnapshot::default();
    for _ in 0..(5 * SNIPE_MOVE_INTERVAL_TICKS + 1) {
        snap = engine.tick();
    }
    assert_eq!(snap.snipes.len(), 1);
    assert_eq!(snap.snipes[0].x, 39);
    assert_eq!(snap.snipes[0].y, 34);
    assert_eq!(snap.snipes[0].dir_x, 1);
    assert_eq!(snap.snipes[0].dir_y, 0);
}

#[test]
fn test_snipes_bounce_head_on() {
    let mut engine = engine_on(open_arena());
    engine.activate();
    engine.set_player_cell(IVec2::new(1, 1));
    let s1 = engine.spawn_test_snipe(IVec2::new(10, 40), IVec2::new(1, 0), 0);
    let s2 = engine.spawn_test_snipe(IVec2::new(12, 40), IVec2::new(-1, 0), 0);

    // Both contend for (11, 40) on their first move interval: both
    // reverse and hold instead of merging.
    let mut snap = GameStateSnapshot::default();
    for _ in 0..(SNIPE_MOVE_INTERVAL_TICKS + 1) {
        snap = engine.tick();
    }
    let a = snap.snipes.iter().find(|s| s.id == s1).unwrap();
    let b = snap.snipes.iter().find(|s| s.id == s2).unwrap();
    assert_eq!((a.x, a.y), (10, 40));
    assert_eq!((b.x, b.y), (12, 40));
    assert_eq!(a.dir_x, -1);
    assert_eq!(b.dir_x, 1);

    // The reversal is idempotent: next interval they walk apart.
    for _ in 0..SNIPE_MOVE_INTERVAL_TICKS {
        snap = engine.tick();
    }
    let a = snap.snipes.iter().find(|s| s.id == s1).unwrap();
    let b = snap.snipes.iter().find(|s| s.id == s2).unwrap();
    assert_eq!((a.x, a.y), (9, 40));
    assert_eq!((b.x, b.y), (13, 40));
}

#[test]
fn test_snipes_never_stand_in_walls() {
    let check = pillar_maze();
    let mut engine = SimulationEngine::new(
        pillar_maze(),
        SimConfig {
            seed: 7,
            ..Default::default()
        },
    );
    engine.queue_command(PlayerCommand::StartLevel { level: 1 });

    for i in 0..1500 {
        let snap = engine.tick();
        if i % 100 == 0 {
            for s in &snap.snipes {
                assert!(
                    !check.is_wall(s.x, s.y),
                    "snipe {} standing in wall at ({}, {})",
                    s.id,
                    s.x,
                    s.y
                );
            }
        }
    }
}

// ---- Hive lifecycle ----

#[test]
fn test_hive_destroyed_after_exactly_three_hits() {
    let mut engine = engine_on(open_arena());
    engine.activate();
    engine.set_player_cell(IVec2::new(50, 50));
    let hive = engine.spawn_test_hive(IVec2::new(5, 5));

    let mut events = Vec::new();
    for hit in 1..=3u8 {
        engine.spawn_test_bullet(IVec2::new(3, 5), IVec2::new(1, 0));
        events.extend(engine.tick().events);
        events.extend(engine.tick().events);

        let hits_seen: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::HiveHit { id, hits, .. } if *id == hive => Some(*hits),
                _ => None,
            })
            .collect();
        assert_eq!(hits_seen.len(), hit as usize);
    }

    // Exactly one destruction event carrying the full reserve.
    let destroyed: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::HiveDestroyed { id, unreleased } if *id == hive => Some(*unreleased),
            _ => None,
        })
        .collect();
    assert_eq!(destroyed, vec![2 * HIVE_SNIPES_PER_VARIANT]);
    assert_eq!(
        engine.score().score,
        SCORE_HIVE_DESTROYED + SCORE_UNRELEASED_SNIPE * 2 * HIVE_SNIPES_PER_VARIANT as u64
    );

    // A fourth bullet crosses the rubble without effect.
    engine.spawn_test_bullet(IVec2::new(3, 5), IVec2::new(1, 0));
    let mut later = Vec::new();
    later.extend(engine.tick().events);
    later.extend(engine.tick().events);
    assert!(!later
        .iter()
        .any(|e| matches!(e, SimEvent::HiveHit { .. } | SimEvent::HiveDestroyed { .. })));

    let snap = engine.tick();
    assert!(snap.hives[0].destroyed);
    assert_eq!(snap.hives[0].remaining, 0);
    assert_eq!(snap.bullets.len(), 1, "bullet flies on over destroyed hive");
}

#[test]
fn test_hive_flash_interval_shrinks_by_thirds() {
    let mut engine = engine_on(open_arena());
    engine.activate();
    engine.set_player_cell(IVec2::new(50, 50));
    engine.spawn_test_hive(IVec2::new(5, 5));

    let mut flashes = Vec::new();
    for _ in 0..3 {
        engine.spawn_test_bullet(IVec2::new(3, 5), IVec2::new(1, 0));
        for _ in 0..2 {
            for e in engine.tick().events {
                if let SimEvent::HiveHit {
                    flash_interval_ms, ..
                } = e
                {
                    flashes.push(flash_interval_ms);
                }
            }
        }
    }
    // 75 -> 50 -> 34 -> 23, never below the floor.
    assert_eq!(flashes, vec![50, 34, 23]);
    assert!(flashes.iter().all(|&f| f >= HIVE_FLASH_FLOOR_MS));
}

#[test]
fn test_hive_spawns_on_interval_and_decrements_reserve() {
    let mut engine = engine_on(open_arena());
    engine.activate();
    engine.set_player_cell(IVec2::new(50, 50));
    engine.spawn_test_hive(IVec2::new(10, 10));

    let mut snap = GameStateSnapshot::default();
    for _ in 0..HIVE_SPAWN_INTERVAL_TICKS {
        snap = engine.tick();
        assert!(snap.snipes.is_empty(), "no snipe before the spawn interval");
    }

    let snap_spawn = engine.tick();
    assert_eq!(snap_spawn.snipes.len(), 1);
    assert_eq!(snap_spawn.hives[0].remaining, 2 * HIVE_SNIPES_PER_VARIANT - 1);
    assert!(snap_spawn
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::SnipeSpawned { .. })));

    // The newborn sits on the ring around the 2x2 footprint.
    let s = &snap_spawn.snipes[0];
    assert!((9..=12).contains(&s.x) && (9..=12).contains(&s.y));
    assert!(!(10..=11).contains(&s.x) || !(10..=11).contains(&s.y));

    // Second release lands within the jittered window.
    let mut seen_second = false;
    for _ in 0..(HIVE_SPAWN_INTERVAL_TICKS + HIVE_SPAWN_JITTER_TICKS + 1) {
        snap = engine.tick();
        if snap.snipes.len() == 2 {
            seen_second = true;
            break;
        }
    }
    assert!(seen_second, "second snipe released within the jitter window");
    assert_eq!(snap.hives[0].remaining, 2 * HIVE_SNIPES_PER_VARIANT - 2);
}

// ---- Combat resolution ----

fn run_bullet_snipe_case(setup: impl FnOnce(&mut SimulationEngine), ticks: u64) -> Vec<SimEvent> {
    let mut engine = engine_on(open_arena());
    engine.activate();
    engine.set_player_cell(IVec2::new(50, 50));
    setup(&mut engine);
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(engine.tick().events);
    }
    assert_eq!(engine.score().score, SCORE_SNIPE_KILL);
    events
}

#[test]
fn test_bullet_snipe_collision_is_symmetric() {
    // Case A: the bullet moves onto a holding snipe.
    let events_a = run_bullet_snipe_case(
        |engine| {
            engine.spawn_test_snipe(IVec2::new(11, 10), IVec2::new(0, 1), 0);
            engine.spawn_test_bullet(IVec2::new(14, 10), IVec2::new(-1, 0));
        },
        4,
    );

    // Case B: the snipe's first move lands on the bullet's cell.
    let events_b = {
        let mut engine = engine_on(open_arena());
        engine.activate();
        engine.set_player_cell(IVec2::new(50, 50));
        engine.spawn_test_snipe(IVec2::new(10, 10), IVec2::new(1, 0), 0);
        let mut events = Vec::new();
        for _ in 0..16 {
            events.extend(engine.tick().events);
        }
        // Arrives at (11, 10) on the same tick the snipe steps there.
        engine.spawn_test_bullet(IVec2::new(16, 10), IVec2::new(-1, 0));
        for _ in 0..5 {
            events.extend(engine.tick().events);
        }
        assert_eq!(engine.score().score, SCORE_SNIPE_KILL);
        events
    };

    // Either actor causing the overlap yields the identical resolution.
    for events in [&events_a, &events_b] {
        assert!(events.iter().any(|e| matches!(
            e,
            SimEvent::SnipeKilled {
                cause: KillCause::Bullet,
                ..
            }
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            SimEvent::BulletRemoved {
                cause: BulletEndCause::HitSnipe,
                ..
            }
        )));
    }
}

#[test]
fn test_bullet_hits_snipe_arrow_cell() {
    run_bullet_snipe_case(
        |engine| {
            // Body (20, 20), arrow (20, 19): shoot the arrow cell.
            engine.spawn_test_snipe(IVec2::new(20, 20), IVec2::new(0, -1), 0);
            engine.spawn_test_bullet(IVec2::new(17, 19), IVec2::new(1, 0));
        },
        4,
    );
}

#[test]
fn test_level_one_seeds_five_full_hives() {
    let mut engine = engine_on(open_arena());
    engine.queue_command(PlayerCommand::StartLevel { level: 1 });
    let snap = engine.tick();

    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::LevelStarted { level: 1, hive_count: 5 })));
    assert_eq!(snap.hives.len(), 5);
    for hive in &snap.hives {
        assert_eq!(hive.remaining, 20);
        assert!(!hive.destroyed);
    }
    assert!(snap.snipes.is_empty());
}

#[test]
fn test_extra_hives_on_later_levels() {
    let mut engine = engine_on(open_arena());
    engine.queue_command(PlayerCommand::StartLevel { level: 6 });
    assert_eq!(engine.tick().hives.len(), 6);

    let mut engine = engine_on(open_arena());
    engine.queue_command(PlayerCommand::StartLevel { level: 11 });
    assert_eq!(engine.tick().hives.len(), 7);
}

#[test]
fn test_full_clear_before_first_spawn_scores_5000() {
    let mut engine = engine_on(open_arena());
    engine.activate();
    engine.set_player_cell(IVec2::new(50, 50));
    for i in 0..5 {
        engine.spawn_test_hive(IVec2::new(4 + 8 * i, 4));
    }

    for i in 0..5 {
        for _ in 0..3 {
            engine.spawn_test_bullet(IVec2::new(2 + 8 * i, 4), IVec2::new(1, 0));
            engine.tick();
            engine.tick();
        }
    }

    // 5 x (500 + 25 x 20) = 5000, with no snipe ever released.
    assert_eq!(engine.score().score, 5000);
    assert_eq!(engine.score().hives_destroyed, 5);
    let snap = engine.tick();
    assert!(snap.snipes.is_empty());
    assert!(snap.hives.iter().all(|h| h.destroyed));
}

#[test]
fn test_player_collision_single_decrement() {
    let mut engine = engine_on(open_arena());
    engine.activate();
    engine.set_player_cell(IVec2::new(30, 30));
    // Both walk into the player footprint on the same interval.
    let s1 = engine.spawn_test_snipe(IVec2::new(29, 30), IVec2::new(1, 0), 0);
    let s2 = engine.spawn_test_snipe(IVec2::new(32, 31), IVec2::new(-1, 0), 0);

    let mut events = Vec::new();
    let mut snap = GameStateSnapshot::default();
    for _ in 0..(SNIPE_MOVE_INTERVAL_TICKS + 1) {
        snap = engine.tick();
        events.extend(snap.events.iter().cloned());
    }

    // Exactly one life decrement and one snipe death, first id wins.
    assert_eq!(snap.score.lives, PLAYER_START_LIVES - 1);
    assert!(!snap.player.alive);
    let kills: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::SnipeKilled {
                id,
                cause: KillCause::PlayerCollision,
            } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(kills, vec![s1]);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, SimEvent::PlayerHit { .. }))
            .count(),
        1
    );
    assert!(snap.snipes.iter().any(|s| s.id == s2));

    // A downed player takes no further hits until repositioned.
    for _ in 0..(2 * SNIPE_MOVE_INTERVAL_TICKS) {
        snap = engine.tick();
    }
    assert_eq!(snap.score.lives, PLAYER_START_LIVES - 1);

    engine.queue_command(PlayerCommand::SetPlayerPosition { x: 10, y: 10 });
    let snap = engine.tick();
    assert!(snap.player.alive);
    assert_eq!((snap.player.x, snap.player.y), (10, 10));
}

#[test]
fn test_lives_exhaustion_ends_the_game() {
    let mut engine = engine_on(open_arena());
    engine.activate();
    // Three sacrifices: dropping the player onto a snipe resolves as a hit.
    engine.spawn_test_snipe(IVec2::new(20, 20), IVec2::new(1, 0), 0);
    engine.spawn_test_snipe(IVec2::new(24, 24), IVec2::new(1, 0), 0);
    engine.spawn_test_snipe(IVec2::new(28, 28), IVec2::new(1, 0), 0);

    for (x, y) in [(20, 20), (24, 24), (28, 28)] {
        engine.queue_command(PlayerCommand::SetPlayerPosition { x, y });
        engine.tick();
    }
    assert_eq!(engine.phase(), GamePhase::GameOver);

    // The clock freezes with the game.
    let frozen = engine.time().tick;
    engine.tick();
    assert_eq!(engine.time().tick, frozen);

    // A new game starts score and lives over.
    engine.queue_command(PlayerCommand::StartLevel { level: 1 });
    let snap = engine.tick();
    assert_eq!(snap.score.lives, PLAYER_START_LIVES);
    assert_eq!(snap.score.score, 0);
    assert_eq!(engine.phase(), GamePhase::Active);
}

#[test]
fn test_hive_destruction_policy_spares_or_kills_released_snipes() {
    for policy in [
        HiveDestructionPolicy::UnreleasedOnly,
        HiveDestructionPolicy::IncludeLiveSnipes,
    ] {
        let mut engine = SimulationEngine::new(
            open_arena(),
            SimConfig {
                destruction_policy: policy,
                ..Default::default()
            },
        );
        engine.activate();
        engine.set_player_cell(IVec2::new(50, 50));
        let hive = engine.spawn_test_hive(IVec2::new(10, 10));
        let owned = engine.spawn_test_snipe(IVec2::new(20, 20), IVec2::new(1, 0), hive);
        let stray = engine.spawn_test_snipe(IVec2::new(25, 25), IVec2::new(1, 0), 99);

        let mut events = Vec::new();
        for _ in 0..3 {
            engine.spawn_test_bullet(IVec2::new(8, 10), IVec2::new(1, 0));
            events.extend(engine.tick().events);
            events.extend(engine.tick().events);
        }

        let snap = engine.tick();
        assert!(snap.hives[0].destroyed);
        match policy {
            HiveDestructionPolicy::UnreleasedOnly => {
                assert!(snap.snipes.iter().any(|s| s.id == owned));
                assert!(!events
                    .iter()
                    .any(|e| matches!(e, SimEvent::SnipeKilled { cause: KillCause::HiveDestroyed, .. })));
            }
            HiveDestructionPolicy::IncludeLiveSnipes => {
                assert!(!snap.snipes.iter().any(|s| s.id == owned));
                assert!(events.iter().any(|e| matches!(
                    e,
                    SimEvent::SnipeKilled {
                        id,
                        cause: KillCause::HiveDestroyed,
                    } if *id == owned
                )));
            }
        }
        assert!(snap.snipes.iter().any(|s| s.id == stray));
    }
}

// ---- Command boundary ----

#[test]
fn test_bullet_cap_rejects_excess_fire() {
    let mut engine = engine_on(open_arena());
    engine.activate();
    engine.set_player_cell(IVec2::new(30, 30));

    for _ in 0..12 {
        engine.queue_command(fire_east());
    }
    let snap = engine.tick();

    assert_eq!(snap.bullets.len(), MAX_ACTIVE_BULLETS);
    assert_eq!(
        snap.events
            .iter()
            .filter(|e| matches!(e, SimEvent::BulletFired { .. }))
            .count(),
        MAX_ACTIVE_BULLETS
    );
}

#[test]
fn test_fire_ignored_outside_active_play() {
    let mut engine = engine_on(open_arena());
    engine.queue_command(fire_east());
    let snap = engine.tick();
    assert!(snap.bullets.is_empty());
    assert!(snap.events.is_empty());
}

#[test]
fn test_fire_rejects_non_step_directions() {
    let mut engine = engine_on(open_arena());
    engine.activate();
    engine.set_player_cell(IVec2::new(30, 30));
    engine.queue_command(PlayerCommand::FireBullet {
        dir_x: 0,
        dir_y: 0,
        owner: 0,
    });
    engine.queue_command(PlayerCommand::FireBullet {
        dir_x: 2,
        dir_y: 0,
        owner: 0,
    });
    let snap = engine.tick();
    assert!(snap.bullets.is_empty());
}

#[test]
fn test_set_player_position_rejects_walls() {
    let mut engine = engine_on(open_arena());
    engine.activate();
    engine.set_player_cell(IVec2::new(30, 30));
    // (0, 0) is border wall; the command is dropped.
    engine.queue_command(PlayerCommand::SetPlayerPosition { x: 0, y: 0 });
    let snap = engine.tick();
    assert_eq!((snap.player.x, snap.player.y), (30, 30));
}

#[test]
fn test_pause_stops_simulation() {
    let mut engine = engine_on(open_arena());
    engine.queue_command(PlayerCommand::StartLevel { level: 1 });

    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.time().tick, 10);
    assert_eq!(engine.phase(), GamePhase::Active);

    engine.queue_command(PlayerCommand::Pause);
    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.time().tick, 10, "time should not advance while paused");
    assert_eq!(engine.phase(), GamePhase::Paused);

    engine.queue_command(PlayerCommand::Resume);
    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.time().tick, 20);
    assert_eq!(engine.phase(), GamePhase::Active);
}

#[test]
fn test_initials_are_echoed_opaquely() {
    let mut engine = engine_on(open_arena());
    engine.queue_command(PlayerCommand::SetInitials {
        initials: "ZAP".to_string(),
    });
    let snap = engine.tick();
    assert_eq!(snap.initials, "ZAP");
}

#[test]
fn test_time_scale_is_clamped() {
    let mut engine = engine_on(open_arena());
    engine.queue_command(PlayerCommand::SetTimeScale { scale: 9.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 4.0);

    engine.queue_command(PlayerCommand::SetTimeScale { scale: -1.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 0.0);
}

// ---- Remote state boundary ----

#[test]
fn test_remote_state_merges_and_validates() {
    let mut engine = engine_on(open_arena());
    engine.activate();
    engine.set_player_cell(IVec2::new(50, 50));

    // Valid snipe appears.
    engine.queue_command(PlayerCommand::ApplyRemoteState {
        state: RemoteEntityState::Snipe {
            id: 7,
            x: 5,
            y: 5,
            dir_x: 1,
            dir_y: 0,
            variant: SnipeVariant::B,
            alive: true,
            hive_id: 3,
        },
    });
    let snap = engine.tick();
    assert_eq!(snap.snipes.len(), 1);
    assert_eq!((snap.snipes[0].x, snap.snipes[0].y), (5, 5));

    // Same id merges in place instead of duplicating.
    engine.queue_command(PlayerCommand::ApplyRemoteState {
        state: RemoteEntityState::Snipe {
            id: 7,
            x: 6,
            y: 5,
            dir_x: 0,
            dir_y: 1,
            variant: SnipeVariant::B,
            alive: true,
            hive_id: 3,
        },
    });
    let snap = engine.tick();
    assert_eq!(snap.snipes.len(), 1);
    assert_eq!((snap.snipes[0].x, snap.snipes[0].y), (6, 5));

    // Malformed updates are dropped at the boundary.
    engine.queue_command(PlayerCommand::ApplyRemoteState {
        state: RemoteEntityState::Snipe {
            id: 8,
            x: 0, // border wall
            y: 0,
            dir_x: 1,
            dir_y: 0,
            variant: SnipeVariant::A,
            alive: true,
            hive_id: 0,
        },
    });
    engine.queue_command(PlayerCommand::ApplyRemoteState {
        state: RemoteEntityState::Hive {
            id: 4,
            x: 20,
            y: 20,
            hits: 7, // beyond the destroy threshold
            destroyed: false,
            remaining_a: 10,
            remaining_b: 10,
        },
    });
    engine.queue_command(PlayerCommand::ApplyRemoteState {
        state: RemoteEntityState::Bullet {
            id: 2,
            owner: 1,
            x: 10.0,
            y: 10.0,
            dir_x: 0, // not a step
            dir_y: 0,
            fired_tick: 0,
        },
    });
    let snap = engine.tick();
    assert_eq!(snap.snipes.len(), 1);
    assert!(snap.hives.is_empty());
    assert!(snap.bullets.is_empty());

    // A valid remote bullet with a skewed clock is clamped, not dropped.
    engine.queue_command(PlayerCommand::ApplyRemoteState {
        state: RemoteEntityState::Bullet {
            id: 2,
            owner: 1,
            x: 10.0,
            y: 10.0,
            dir_x: 0,
            dir_y: 1,
            fired_tick: u64::MAX,
        },
    });
    let snap = engine.tick();
    assert_eq!(snap.bullets.len(), 1);

    // Valid remote hive appears with a recomputed flash cadence.
    engine.queue_command(PlayerCommand::ApplyRemoteState {
        state: RemoteEntityState::Hive {
            id: 4,
            x: 20,
            y: 20,
            hits: 2,
            destroyed: false,
            remaining_a: 5,
            remaining_b: 0,
        },
    });
    let snap = engine.tick();
    assert_eq!(snap.hives.len(), 1);
    assert_eq!(snap.hives[0].remaining, 5);
    assert_eq!(snap.hives[0].flash_interval_ms, 34);
}
