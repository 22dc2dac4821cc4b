//! Parlor grid - pure 4x4 sliding-tile transforms.
//!
//! Every function takes a grid by value and returns a new one; nothing here
//! is shared between callers. `0` marks an empty cell.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use rand::Rng;
use tracing::{instrument, trace};

/// Side length of the grid.
pub const SIZE: usize = 4;

/// Row-major tile values, `0` for empty.
pub type Grid = [[u32; SIZE]; SIZE];

/// Compacts one row toward index 0, merging each equal pair once.
fn slide_row(row: [u32; SIZE]) -> [u32; SIZE] {
    let mut tiles: Vec<u32> = row.into_iter().filter(|&v| v != 0).collect();
    let mut i = 0;
    while i + 1 < tiles.len() {
        if tiles[i] == tiles[i + 1] {
            tiles[i] *= 2;
            tiles.remove(i + 1);
        }
        i += 1;
    }
    let mut out = [0; SIZE];
    out[..tiles.len()].copy_from_slice(&tiles);
    out
}

fn reversed(row: [u32; SIZE]) -> [u32; SIZE] {
    let mut row = row;
    row.reverse();
    row
}

fn transpose(grid: Grid) -> Grid {
    let mut out = [[0; SIZE]; SIZE];
    for (r, row) in grid.iter().enumerate() {
        for (c, &value) in row.iter().enumerate() {
            out[c][r] = value;
        }
    }
    out
}

/// Slides every row toward the left edge.
#[instrument(level = "trace")]
pub fn slide_left(grid: Grid) -> Grid {
    grid.map(slide_row)
}

/// Slides every row toward the right edge.
#[instrument(level = "trace")]
pub fn slide_right(grid: Grid) -> Grid {
    grid.map(|row| reversed(slide_row(reversed(row))))
}

/// Slides every column toward the top edge.
#[instrument(level = "trace")]
pub fn slide_up(grid: Grid) -> Grid {
    transpose(slide_left(transpose(grid)))
}

/// Slides every column toward the bottom edge.
#[instrument(level = "trace")]
pub fn slide_down(grid: Grid) -> Grid {
    transpose(slide_right(transpose(grid)))
}

/// Places a 2 (90%) or a 4 (10%) in a random empty cell.
///
/// A full grid comes back unchanged.
#[instrument(level = "trace", skip(rng))]
pub fn spawn_random_tile<R: Rng + ?Sized>(grid: Grid, rng: &mut R) -> Grid {
    let empty: Vec<(usize, usize)> = (0..SIZE)
        .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
        .filter(|&(r, c)| grid[r][c] == 0)
        .collect();
    if empty.is_empty() {
        return grid;
    }
    let (r, c) = empty[rng.gen_range(0..empty.len())];
    let mut out = grid;
    out[r][c] = if rng.gen_bool(0.9) { 2 } else { 4 };
    trace!(row = r, col = c, value = out[r][c], "Spawned tile");
    out
}

/// Checks if any slide could change the grid.
pub fn has_any_move(grid: &Grid) -> bool {
    for r in 0..SIZE {
        for c in 0..SIZE {
            let value = grid[r][c];
            if value == 0 {
                return true;
            }
            if c + 1 < SIZE && grid[r][c + 1] == value {
                return true;
            }
            if r + 1 < SIZE && grid[r + 1][c] == value {
                return true;
            }
        }
    }
    false
}
