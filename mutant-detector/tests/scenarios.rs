//! Classification scenarios on larger and generated grids

use mutant_detector::{classify, find_runs, Base, Direction, Grid, MUTANT_THRESHOLD};

/// Build an NxN grid with no runs at all: each row is the 4-base cycle
/// shifted by two per row, so no line repeats a base four times.
fn run_free(n: usize) -> Vec<String> {
    const CYCLE: [char; 4] = ['A', 'T', 'C', 'G'];
    (0..n)
        .map(|row| (0..n).map(|col| CYCLE[(col + 2 * row) % 4]).collect())
        .collect()
}

#[test]
fn test_run_free_grids_are_human() {
    for n in [4, 5, 8, 17, 64] {
        let rows = run_free(n);
        let grid = Grid::parse(&rows).unwrap();
        assert!(find_runs(&grid, usize::MAX).is_empty(), "{n}x{n} should be run free");
        assert!(!classify(&grid));
    }
}

#[test]
fn test_two_runs_far_apart_in_large_grid() {
    let n = 50;
    let mut rows = run_free(n);

    // One horizontal run near the top, one vertical run at the bottom right.
    rows[1].replace_range(10..14, "TTTT");
    for row in rows.iter_mut().skip(n - 4) {
        row.replace_range(n - 1..n, "C");
    }

    let grid = Grid::parse(&rows).unwrap();
    let runs = find_runs(&grid, usize::MAX);
    assert_eq!(runs.len(), 2, "{runs:?}");
    assert_eq!((runs[0].row, runs[0].column, runs[0].direction), (1, 10, Direction::Right));
    assert_eq!((runs[1].row, runs[1].column, runs[1].direction), (n - 4, n - 1, Direction::Down));
    assert!(classify(&grid));
}

#[test]
fn test_single_run_in_large_grid_is_human() {
    let n = 30;
    let mut rows = run_free(n);
    rows[12].replace_range(0..4, "TTTT");

    let grid = Grid::parse(&rows).unwrap();
    assert_eq!(find_runs(&grid, usize::MAX).len(), 1);
    assert!(!classify(&grid));
}

#[test]
fn test_mutant_stops_at_threshold() {
    let grid = Grid::filled(Base::A, 100);
    let runs = find_runs(&grid, MUTANT_THRESHOLD);
    assert_eq!(runs.len(), MUTANT_THRESHOLD);
    assert!(runs.iter().all(|r| r.row == 0 && r.column == 0));
    assert!(classify(&grid));
}

#[test]
fn test_validation_rejects_before_classification() {
    assert!(Grid::parse(&["ATGCGA", "CAGTGC", "TTATGT", "AGAAGG", "CCCCTA"]).is_err());
    assert!(Grid::parse(&["ATGCGA", "CAGTGC", "TTATGT", "AGAAGG", "CCCCTA", "TCACTN"]).is_err());
    assert!(Grid::parse::<&str>(&[]).is_err());
}
