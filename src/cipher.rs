//! Digraph substitution
//!
//! Two letters in the same row each move one column (right to encrypt, left
//! to decrypt, wrapping). Two letters in the same column each move one row
//! (down to encrypt, up to decrypt). Otherwise each letter takes the column
//! of the other, which is its own inverse.
//!
//! The row test is made first, so a digraph of two identical letters is
//! treated as sharing a row.

use serde::{Deserialize, Serialize};

use crate::alphabet::Letter;
use crate::matrix::{Matrix, SIZE};
use crate::pairing::Digraph;

/// Which way a digraph is being transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl Direction {
    fn step(self, index: usize) -> usize {
        match self {
            Direction::Encrypt => (index + 1) % SIZE,
            Direction::Decrypt => (index + SIZE - 1) % SIZE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Encrypt => "encrypt",
            Direction::Decrypt => "decrypt",
        }
    }
}

/// Substitutes one digraph in the given direction.
pub fn substitute(matrix: &Matrix, pair: Digraph, direction: Direction) -> Digraph {
    let a = matrix.position(pair.first);
    let b = matrix.position(pair.second);

    if a.row == b.row {
        Digraph::new(
            matrix.at(a.row, direction.step(a.col)),
            matrix.at(b.row, direction.step(b.col)),
        )
    } else if a.col == b.col {
        Digraph::new(
            matrix.at(direction.step(a.row), a.col),
            matrix.at(direction.step(b.row), b.col),
        )
    } else {
        Digraph::new(matrix.at(a.row, b.col), matrix.at(b.row, a.col))
    }
}

pub fn encrypt_pair(matrix: &Matrix, a: Letter, b: Letter) -> Digraph {
    substitute(matrix, Digraph::new(a, b), Direction::Encrypt)
}

pub fn decrypt_pair(matrix: &Matrix, a: Letter, b: Letter) -> Digraph {
    substitute(matrix, Digraph::new(a, b), Direction::Decrypt)
}
