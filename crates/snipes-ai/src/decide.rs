//! Snipe movement decision functions.
//!
//! Pure decision logic over plain data — no ECS dependency. The sim crate
//! feeds one context per snipe per move interval and commits the result.
//! The random source is injected so identical seeds replay identically.

use std::collections::HashSet;

use glam::IVec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use snipes_core::constants::HEAT_RADIUS;
use snipes_maze::WallGrid;

/// The eight unit steps, clockwise from north.
pub const DIRECTIONS: [IVec2; 8] = [
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(1, 0),
    IVec2::new(1, 1),
    IVec2::new(0, 1),
    IVec2::new(-1, 1),
    IVec2::new(-1, 0),
    IVec2::new(-1, -1),
];

/// Input to one snipe's movement decision.
pub struct SnipeContext<'a> {
    pub cell: IVec2,
    /// Current heading. May be (0, 0) only transiently at spawn.
    pub dir: IVec2,
    pub player: IVec2,
    pub grid: &'a WallGrid,
    /// Wrapped cells a snipe may not enter: other live snipes and hive
    /// footprints.
    pub blocked: &'a HashSet<(i32, i32)>,
}

/// Output of one decision.
pub struct SnipeUpdate {
    /// New heading: kept, attracted, or randomly re-decided.
    pub dir: IVec2,
    /// Destination cell (wrapped), or None to hold this interval.
    pub step: Option<IVec2>,
}

/// Attraction curve inside the heat radius: certain homing at distance 0,
/// falling linearly to fully random at the radius.
pub fn attraction_probability(dist: i32) -> f64 {
    if dist >= HEAT_RADIUS {
        return 0.0;
    }
    1.0 - dist.max(0) as f64 / HEAT_RADIUS as f64
}

/// The single axis-step that most reduces torus distance to `to`.
/// Returns (0, 0) when already there.
pub fn step_toward(grid: &WallGrid, from: IVec2, to: IVec2) -> IVec2 {
    grid.torus_delta(from, to).signum()
}

/// Decide one snipe's move for this interval.
///
/// Persistence is the default: the heading is only re-decided when the
/// heat-radius roll elects to home in, the next cell is a wall, or the
/// next cell is occupied. Far snipes consume no randomness at all.
pub fn evaluate(ctx: &SnipeContext, rng: &mut ChaCha8Rng) -> SnipeUpdate {
    let mut dir = ctx.dir;

    let dist = ctx.grid.chebyshev(ctx.cell, ctx.player);
    if dist <= HEAT_RADIUS {
        let p = attraction_probability(dist);
        if p > 0.0 && rng.gen_bool(p) {
            dir = step_toward(ctx.grid, ctx.cell, ctx.player);
        }
    }

    if dir != IVec2::ZERO {
        let next = ctx.grid.wrap(ctx.cell + dir);
        if !ctx.grid.is_wall_cell(next) && !ctx.blocked.contains(&(next.x, next.y)) {
            return SnipeUpdate {
                dir,
                step: Some(next),
            };
        }
    }

    // Triggered: pick a new heading among the steps that do not lead into
    // a wall, preferring ones that are also unoccupied.
    let mut open = Vec::new();
    let mut free = Vec::new();
    for &d in &DIRECTIONS {
        let cand = ctx.grid.wrap(ctx.cell + d);
        if ctx.grid.is_wall_cell(cand) {
            continue;
        }
        open.push(d);
        if !ctx.blocked.contains(&(cand.x, cand.y)) {
            free.push(d);
        }
    }
    let pool = if free.is_empty() { &open } else { &free };
    if pool.is_empty() {
        // Fully boxed in by walls. Hold; should not occur on a connected
        // maze.
        return SnipeUpdate { dir, step: None };
    }

    let dir = pool[rng.gen_range(0..pool.len())];
    let next = ctx.grid.wrap(ctx.cell + dir);
    if ctx.blocked.contains(&(next.x, next.y)) {
        // Every passable neighbor is occupied; keep the new heading but
        // hold position this interval.
        return SnipeUpdate { dir, step: None };
    }
    SnipeUpdate {
        dir,
        step: Some(next),
    }
}
