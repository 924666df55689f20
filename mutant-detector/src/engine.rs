//! Run scanning and mutant classification.
//!
//! Every cell is visited in row-major order as a candidate run start and
//! probed in four directions only: right, down, down-right and down-left.
//! A run in any of the opposite directions is the same run seen from its
//! other end, so it is still found exactly once.
//!
//! Complexity is O(N²) for human grids and grids with a single run; the
//! scan stops as soon as the second run is confirmed.

use serde::{Deserialize, Serialize};

use crate::grid::{Base, Grid};

/// Number of identical, adjacent bases that make a run.
pub const RUN_LENGTH: usize = 4;

/// A grid is mutant once this many runs are found.
pub const MUTANT_THRESHOLD: usize = 2;

/// Scan direction from a run's leading cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Right,
    Down,
    DownRight,
    DownLeft,
}

impl Direction {
    /// Probe order at each cell.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::DownRight,
        Direction::DownLeft,
    ];

    /// `(Δrow, Δcol)` step vector.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::DownRight => (1, 1),
            Direction::DownLeft => (1, -1),
        }
    }
}

/// A run of [`RUN_LENGTH`] identical bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// Leading cell row
    pub row: usize,
    /// Leading cell column
    pub column: usize,
    pub direction: Direction,
    pub base: Base,
}

/// Classify a grid: `true` when it holds more than one run.
///
/// Overlapping runs on the same line count separately, so five identical
/// bases in a row are enough on their own.
pub fn classify(grid: &Grid) -> bool {
    debug_assert!(grid.is_square(), "classify called with a non-square grid");
    scan(grid, MUTANT_THRESHOLD, |_| {}) >= MUTANT_THRESHOLD
}

/// Collect runs in scan order, stopping after `limit` of them.
///
/// `find_runs(grid, MUTANT_THRESHOLD)` visits exactly the cells that
/// [`classify`] visits.
pub fn find_runs(grid: &Grid, limit: usize) -> Vec<Run> {
    let mut runs = Vec::new();
    scan(grid, limit, |run| runs.push(run));
    runs
}

fn scan(grid: &Grid, limit: usize, mut on_run: impl FnMut(Run)) -> usize {
    let n = grid.size();
    if limit == 0 || n < RUN_LENGTH {
        return 0;
    }

    let mut found = 0;
    for row in 0..n {
        for column in 0..n {
            for direction in Direction::ALL {
                if !run_starts_at(grid, row, column, direction) {
                    continue;
                }

                on_run(Run {
                    row,
                    column,
                    direction,
                    base: grid.get(row, column),
                });
                found += 1;
                if found >= limit {
                    return found;
                }
            }
        }
    }

    found
}

/// Bounds check for the far end, then compare offsets 1..RUN_LENGTH against
/// the leading base.
fn run_starts_at(grid: &Grid, row: usize, column: usize, direction: Direction) -> bool {
    let n = grid.size() as isize;
    let (dr, dc) = direction.delta();
    let (row, column) = (row as isize, column as isize);
    let span = (RUN_LENGTH - 1) as isize;

    let end_row = row + span * dr;
    let end_column = column + span * dc;
    if !(0..n).contains(&end_row) || !(0..n).contains(&end_column) {
        return false;
    }

    let base = grid.get(row as usize, column as usize);
    (1..RUN_LENGTH as isize)
        .all(|step| grid.get((row + step * dr) as usize, (column + step * dc) as usize) == base)
}
