//! Mutant DNA detection engine
//!
//! A DNA sample is an NxN grid over the bases A, T, C and G. The sample is
//! **mutant** when it contains more than one run of four identical bases,
//! read horizontally, vertically or along either diagonal.
//!
//! - [`Grid`]: validated, immutable grid. [`Grid::parse`] rejects empty,
//!   non-square and non-ACGT input with a [`GridError`].
//! - [`classify`]: pure, allocation-free classifier with early termination.
//! - [`find_runs`]: the same scan, returning the runs it found.
//!
//! # Example
//!
//! ```
//! use mutant_detector::{classify, Grid};
//!
//! let dna = Grid::parse(&["ATGCGA", "CAGTGC", "TTATGT", "AGAAGG", "CCCCTA", "TCACTG"])?;
//! assert!(classify(&dna));
//! # Ok::<(), mutant_detector::GridError>(())
//! ```

pub mod engine;
pub mod grid;

pub use engine::{classify, find_runs, Direction, Run, MUTANT_THRESHOLD, RUN_LENGTH};
pub use grid::{Base, Grid, GridError};
