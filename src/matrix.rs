//! Key-derived 5x5 substitution matrix
//!
//! The matrix is the key's distinct letters in order of first appearance,
//! followed by the rest of the working alphabet in ascending order, laid out
//! row-major. A key with no letters yields the plain alphabet.

use serde::{Serialize, Serializer};

use crate::alphabet::{self, ALPHABET, Letter};

/// Number of rows and of columns.
pub const SIZE: usize = 5;

/// Cell coordinates of a letter within a [`Matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

/// A 5x5 grid holding each letter of the working alphabet exactly once.
///
/// Serializes as five rows of five single-letter strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: [[Letter; SIZE]; SIZE],
    // Cell index (row * SIZE + col) of each letter, by ordinal.
    cells: [u8; 26],
}

impl Matrix {
    /// Builds the matrix for `key`.
    pub fn from_key(key: &str) -> Matrix {
        let mut seen = [false; 26];
        let mut rows = [[alphabet::PAD; SIZE]; SIZE];
        let mut cells = [0u8; 26];
        let mut filled = 0;

        for letter in alphabet::letters(key).into_iter().chain(ALPHABET) {
            if seen[letter.ordinal()] {
                continue;
            }
            seen[letter.ordinal()] = true;
            rows[filled / SIZE][filled % SIZE] = letter;
            cells[letter.ordinal()] = filled as u8;
            filled += 1;
        }
        debug_assert_eq!(filled, SIZE * SIZE);

        Matrix { rows, cells }
    }

    /// Returns the letter at `row`, `col`. Both must be below [`SIZE`].
    pub fn at(&self, row: usize, col: usize) -> Letter {
        self.rows[row][col]
    }

    pub fn rows(&self) -> &[[Letter; SIZE]; SIZE] {
        &self.rows
    }

    /// Locates `letter` in the grid. Total over the working alphabet.
    pub fn position(&self, letter: Letter) -> Position {
        let cell = usize::from(self.cells[letter.ordinal()]);
        Position {
            row: cell / SIZE,
            col: cell % SIZE,
        }
    }
}

impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

/// Builds the matrix for `key`.
pub fn build_matrix(key: &str) -> Matrix {
    Matrix::from_key(key)
}

/// Locates `letter` in `matrix`.
pub fn find_position(matrix: &Matrix, letter: Letter) -> Position {
    matrix.position(letter)
}
