//! WallGrid: static wall bitmap with toroidal queries.

use glam::{DVec2, IVec2};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Errors from building a grid out of externally supplied geometry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: i32, height: i32 },
    #[error("wall bitmap holds {got} bytes, expected {expected} for {width}x{height}")]
    BitmapSize {
        width: i32,
        height: i32,
        got: usize,
        expected: usize,
    },
    #[error("row {row} is {got} cells wide, expected {expected}")]
    RaggedRow {
        row: usize,
        got: usize,
        expected: usize,
    },
    #[error("unrecognized map glyph {glyph:?} at ({x}, {y})")]
    BadGlyph { glyph: char, x: usize, y: usize },
}

/// Immutable wrap-around wall bitmap.
///
/// Walls are packed one bit per cell, row-major (bit 1 = wall). Every
/// query reduces coordinates modulo (width, height) with a non-negative
/// result, so the world is a torus and callers may pass any integers.
#[derive(Debug, Clone)]
pub struct WallGrid {
    width: i32,
    height: i32,
    walls: Vec<u8>,
    /// All passable cells, row-major, for spawn-site selection.
    open: Vec<IVec2>,
}

impl WallGrid {
    /// Build from packed wall bits, row-major, one bit per cell.
    pub fn new(width: i32, height: i32, walls: Vec<u8>) -> Result<Self, GridError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::EmptyGrid { width, height });
        }
        let expected = (width as usize * height as usize).div_ceil(8);
        if walls.len() != expected {
            return Err(GridError::BitmapSize {
                width,
                height,
                got: walls.len(),
                expected,
            });
        }

        let mut grid = Self {
            width,
            height,
            walls,
            open: Vec::new(),
        };
        let open: Vec<IVec2> = (0..height)
            .flat_map(|y| (0..width).map(move |x| IVec2::new(x, y)))
            .filter(|c| !grid.raw_is_wall(c.x, c.y))
            .collect();
        grid.open = open;
        Ok(grid)
    }

    /// Build from ASCII rows: `'#'` is a wall, `'.'` or `' '` is open.
    /// Rows must all be the same width.
    pub fn from_rows(rows: &[&str]) -> Result<Self, GridError> {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as i32;
        if width <= 0 || height <= 0 {
            return Err(GridError::EmptyGrid { width, height });
        }

        let mut walls = vec![0u8; (width as usize * height as usize).div_ceil(8)];
        for (y, row) in rows.iter().enumerate() {
            let got = row.chars().count();
            if got != width as usize {
                return Err(GridError::RaggedRow {
                    row: y,
                    got,
                    expected: width as usize,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                match glyph {
                    '#' => {
                        let idx = y * width as usize + x;
                        walls[idx / 8] |= 1 << (idx % 8);
                    }
                    '.' | ' ' => {}
                    _ => return Err(GridError::BadGlyph { glyph, x, y }),
                }
            }
        }
        Self::new(width, height, walls)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Is the (wrapped) cell a wall?
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.raw_is_wall(x.rem_euclid(self.width), y.rem_euclid(self.height))
    }

    /// `is_wall` over a cell vector.
    pub fn is_wall_cell(&self, cell: IVec2) -> bool {
        self.is_wall(cell.x, cell.y)
    }

    fn raw_is_wall(&self, x: i32, y: i32) -> bool {
        let idx = y as usize * self.width as usize + x as usize;
        self.walls[idx / 8] & (1 << (idx % 8)) != 0
    }

    /// Reduce a cell onto the torus; the result is always non-negative.
    pub fn wrap(&self, cell: IVec2) -> IVec2 {
        IVec2::new(cell.x.rem_euclid(self.width), cell.y.rem_euclid(self.height))
    }

    /// Reduce a continuous position onto the torus.
    pub fn wrap_f(&self, pos: DVec2) -> DVec2 {
        DVec2::new(
            pos.x.rem_euclid(self.width as f64),
            pos.y.rem_euclid(self.height as f64),
        )
    }

    /// Shortest signed per-axis delta from `from` to `to` on the torus.
    pub fn torus_delta(&self, from: IVec2, to: IVec2) -> IVec2 {
        IVec2::new(
            axis_delta(to.x - from.x, self.width),
            axis_delta(to.y - from.y, self.height),
        )
    }

    /// Chebyshev distance on the torus.
    pub fn chebyshev(&self, a: IVec2, b: IVec2) -> i32 {
        let d = self.torus_delta(a, b);
        d.x.abs().max(d.y.abs())
    }

    /// All passable cells.
    pub fn open_cells(&self) -> &[IVec2] {
        &self.open
    }

    /// A uniformly random passable cell, or None on an all-wall grid.
    pub fn random_open_cell(&self, rng: &mut ChaCha8Rng) -> Option<IVec2> {
        if self.open.is_empty() {
            return None;
        }
        Some(self.open[rng.gen_range(0..self.open.len())])
    }

    /// True when every cell of the `size`x`size` footprint anchored at
    /// `top_left` is passable.
    pub fn footprint_open(&self, top_left: IVec2, size: i32) -> bool {
        (0..size).all(|dy| (0..size).all(|dx| !self.is_wall(top_left.x + dx, top_left.y + dy)))
    }
}

/// Wrap a single-axis delta to the shortest signed distance on a ring of
/// the given size.
fn axis_delta(d: i32, size: i32) -> i32 {
    let d = d.rem_euclid(size);
    if d > size / 2 {
        d - size
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn make_test_grid() -> WallGrid {
        WallGrid::from_rows(&[
            "#####", //
            "#...#", //
            "#.#.#", //
            "#...#", //
            "#####",
        ])
        .unwrap()
    }

    #[test]
    fn test_is_wall_basic() {
        let grid = make_test_grid();
        assert!(grid.is_wall(0, 0));
        assert!(!grid.is_wall(1, 1));
        assert!(grid.is_wall(2, 2));
        assert!(!grid.is_wall(3, 3));
    }

    #[test]
    fn test_is_wall_wraps_toroidally() {
        let grid = make_test_grid();
        // (-4, 1) wraps to (1, 1): open. (5, 0) wraps to (0, 0): wall.
        assert!(!grid.is_wall(-4, 1));
        assert!(grid.is_wall(5, 0));
        assert!(grid.is_wall(0, -5));
        // Wrapping far out stays consistent.
        assert_eq!(grid.is_wall(1 + 50, 1 + 50), grid.is_wall(1, 1));
    }

    #[test]
    fn test_wrap_is_non_negative() {
        let grid = make_test_grid();
        let w = grid.wrap(IVec2::new(-1, -7));
        assert_eq!(w, IVec2::new(4, 3));
        let wf = grid.wrap_f(DVec2::new(-0.5, 5.5));
        assert!(wf.x >= 0.0 && wf.x < 5.0);
        assert!((wf.x - 4.5).abs() < 1e-12);
        assert!((wf.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_torus_delta_takes_short_way() {
        let grid = make_test_grid();
        // From x=4 to x=0 the short way is +1 (wrap), not -4.
        assert_eq!(grid.torus_delta(IVec2::new(4, 0), IVec2::new(0, 0)).x, 1);
        assert_eq!(grid.torus_delta(IVec2::new(0, 0), IVec2::new(4, 0)).x, -1);
        assert_eq!(grid.torus_delta(IVec2::new(1, 1), IVec2::new(3, 3)), IVec2::new(2, 2));
    }

    #[test]
    fn test_chebyshev_on_torus() {
        let grid = make_test_grid();
        assert_eq!(grid.chebyshev(IVec2::new(0, 0), IVec2::new(4, 4)), 1);
        assert_eq!(grid.chebyshev(IVec2::new(1, 1), IVec2::new(3, 2)), 2);
        assert_eq!(grid.chebyshev(IVec2::new(2, 2), IVec2::new(2, 2)), 0);
    }

    #[test]
    fn test_open_cells_and_random_pick() {
        let grid = make_test_grid();
        // 3x3 interior minus the center pillar.
        assert_eq!(grid.open_cells().len(), 8);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..32 {
            let cell = grid.random_open_cell(&mut rng).unwrap();
            assert!(!grid.is_wall_cell(cell));
        }
    }

    #[test]
    fn test_footprint_open() {
        let grid = WallGrid::from_rows(&[
            "######", //
            "#....#", //
            "#....#", //
            "#..#.#", //
            "######",
        ])
        .unwrap();
        assert!(grid.footprint_open(IVec2::new(1, 1), 2));
        assert!(!grid.footprint_open(IVec2::new(3, 2), 2));
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let err = WallGrid::from_rows(&["###", "##"]).unwrap_err();
        assert!(matches!(err, GridError::RaggedRow { row: 1, .. }));

        let err = WallGrid::from_rows(&[]).unwrap_err();
        assert!(matches!(err, GridError::EmptyGrid { .. }));

        let err = WallGrid::from_rows(&["#x#"]).unwrap_err();
        assert!(matches!(err, GridError::BadGlyph { glyph: 'x', .. }));
    }

    #[test]
    fn test_new_rejects_wrong_bitmap_size() {
        let err = WallGrid::new(8, 2, vec![0u8; 1]).unwrap_err();
        assert!(matches!(err, GridError::BitmapSize { expected: 2, .. }));
    }
}
