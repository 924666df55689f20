//! Validated NxN grids of nitrogenous bases.
//!
//! [`Grid::parse`] is the only way to build a grid from raw rows, so every
//! `Grid` the engine sees is square, non-empty and restricted to A, T, C, G.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reasons a set of raw rows is not a valid DNA grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("DNA sequence cannot be null or empty")]
    Empty,

    #[error("DNA must be NxN matrix. Expected size: {expected}, but row {row} has size: {actual}")]
    NotSquare {
        expected: usize,
        row: usize,
        actual: usize,
    },

    #[error("DNA sequence contains invalid characters in row {row}. Only A, T, C, G are allowed")]
    InvalidBase {
        row: usize,
        column: usize,
        found: char,
    },
}

/// One of the four nitrogenous bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Base {
    A,
    T,
    C,
    G,
}

impl Base {
    pub fn as_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::T => 'T',
            Base::C => 'C',
            Base::G => 'G',
        }
    }

    /// ASCII byte of the base, used for content hashing.
    pub fn as_byte(self) -> u8 {
        self.as_char() as u8
    }
}

impl TryFrom<char> for Base {
    type Error = char;

    /// Case-sensitive: lowercase bases are rejected.
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'A' => Ok(Base::A),
            'T' => Ok(Base::T),
            'C' => Ok(Base::C),
            'G' => Ok(Base::G),
            other => Err(other),
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Immutable NxN matrix of bases, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<Base>,
}

impl Grid {
    /// Validate raw rows into a grid.
    ///
    /// Rows are checked in order and the first failure is reported: a row
    /// whose length differs from the row count yields [`GridError::NotSquare`],
    /// otherwise its first disallowed character yields
    /// [`GridError::InvalidBase`].
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let size = rows.len();
        if size == 0 {
            return Err(GridError::Empty);
        }

        // Row count is untrusted; cells grow only as rows pass the length check.
        let mut cells = Vec::new();
        for (row, sequence) in rows.iter().enumerate() {
            let sequence = sequence.as_ref();
            if sequence.len() != size || !sequence.is_ascii() {
                let actual = sequence.chars().count();
                if actual != size {
                    return Err(GridError::NotSquare {
                        expected: size,
                        row,
                        actual,
                    });
                }
            }

            cells.reserve(size);
            for (column, c) in sequence.chars().enumerate() {
                let base = Base::try_from(c)
                    .map_err(|found| GridError::InvalidBase { row, column, found })?;
                cells.push(base);
            }
        }

        Ok(Self { size, cells })
    }

    /// A grid holding `base` in every cell.
    pub fn filled(base: Base, size: usize) -> Self {
        assert!(size > 0, "grid size must be at least 1");
        Self {
            size,
            cells: vec![base; size * size],
        }
    }

    /// Side length N.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Base at `(row, col)`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Base {
        assert!(row < self.size && col < self.size, "cell ({row}, {col}) outside {0}x{0} grid", self.size);
        self.cells[row * self.size + col]
    }

    pub fn row(&self, row: usize) -> &[Base] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Base]> + '_ {
        self.cells.chunks(self.size)
    }

    pub(crate) fn is_square(&self) -> bool {
        self.size > 0 && self.cells.len() == self.size * self.size
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Parse rows separated by commas and/or whitespace, e.g.
    /// `"ATGC,CAGT,TTAT,AGAA"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|row| !row.is_empty())
            .collect();
        Self::parse(&rows)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for base in row {
                write!(f, "{base}")?;
            }
        }
        Ok(())
    }
}
