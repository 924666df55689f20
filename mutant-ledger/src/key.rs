//! Content keys for grids
//!
//! A key is the SHA-256 of a length-prefixed encoding of the grid:
//!
//! ```text
//! u32 LE  N
//! repeat N times:
//!   u32 LE  row length
//!   bytes   row bases as ASCII
//! ```
//!
//! The per-row prefix keeps different row splits of the same base sequence
//! apart, e.g. `["AT","CG"]` and `["A","TCG"]`.

use mutant_detector::Grid;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Key length in bytes
pub const KEY_LEN: usize = 32;

/// Deterministic digest identifying a grid's content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentKey([u8; KEY_LEN]);

impl ContentKey {
    /// Derive the key of a grid.
    pub fn of(grid: &Grid) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((grid.size() as u32).to_le_bytes());
        for row in grid.rows() {
            hasher.update((row.len() as u32).to_le_bytes());
            let bytes: Vec<u8> = row.iter().map(|b| b.as_byte()).collect();
            hasher.update(&bytes);
        }
        Self(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey({})", &self.to_hex()[..16])
    }
}

impl FromStr for ContentKey {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; KEY_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        Grid::parse(rows).unwrap()
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = ContentKey::of(&grid(&["ATGC", "CAGT", "TTAT", "AGAA"]));
        let b = ContentKey::of(&grid(&["ATGC", "CAGT", "TTAT", "AGAA"]));
        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), 64);
    }

    #[test]
    fn test_key_distinguishes_content() {
        let a = ContentKey::of(&grid(&["ATGC", "CAGT", "TTAT", "AGAA"]));
        let b = ContentKey::of(&grid(&["ATGC", "CAGT", "TTAT", "AGAT"]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_distinguishes_sizes_with_same_prefix() {
        // A 2x2 grid whose flattened bases equal the first four bases of a 4x4
        // grid's flattening must still hash differently.
        let small = ContentKey::of(&grid(&["AT", "CG"]));
        let large = ContentKey::of(&grid(&["ATCG", "ATCG", "ATCG", "ATCG"]));
        assert_ne!(small, large);
    }

    #[test]
    fn test_key_matches_documented_encoding() {
        let mut hasher = Sha256::new();
        hasher.update(2u32.to_le_bytes());
        hasher.update(2u32.to_le_bytes());
        hasher.update(b"AT");
        hasher.update(2u32.to_le_bytes());
        hasher.update(b"CG");
        let expected: [u8; KEY_LEN] = hasher.finalize().into();

        assert_eq!(ContentKey::of(&grid(&["AT", "CG"])).as_bytes(), &expected);
    }

    #[test]
    fn test_hex_roundtrip() {
        let key = ContentKey::of(&grid(&["A"]));
        let parsed: ContentKey = key.to_hex().parse().unwrap();
        assert_eq!(parsed, key);
        assert!("not-hex".parse::<ContentKey>().is_err());
        assert!("abcd".parse::<ContentKey>().is_err());
    }
}
