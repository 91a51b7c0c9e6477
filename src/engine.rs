//! Whole-message encryption and decryption
//!
//! Each call builds its own matrix, pairs the normalized input, substitutes
//! every digraph in order, and returns the result alongside the matrix and
//! the digraphs that were fed to it. Nothing is shared between calls.

use serde::{Serialize, Serializer};

use crate::alphabet;
use crate::cipher::{self, Direction};
use crate::matrix::Matrix;
use crate::pairing::{self, Digraph};

/// The outcome of one encryption or decryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CipherOutput {
    pub result: String,
    /// `None` when the call short-circuited on empty input. Serialized as `[]`.
    #[serde(serialize_with = "serialize_matrix")]
    pub matrix: Option<Matrix>,
    pub pairs: Vec<Digraph>,
}

impl CipherOutput {
    pub fn empty() -> Self {
        Self {
            result: String::new(),
            matrix: None,
            pairs: Vec::new(),
        }
    }

    /// True when the call short-circuited and no matrix was built.
    pub fn is_empty(&self) -> bool {
        self.matrix.is_none()
    }
}

pub(crate) fn serialize_matrix<S: Serializer>(
    matrix: &Option<Matrix>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match matrix {
        Some(matrix) => matrix.serialize(serializer),
        None => serializer.collect_seq(std::iter::empty::<()>()),
    }
}

/// Runs the cipher over `text` in the given direction.
///
/// If `text` has no letters or `key` is the empty string, returns
/// [`CipherOutput::empty`] without building a matrix. A key that is
/// non-empty but contains no letters uses the plain alphabet matrix.
pub fn run(direction: Direction, text: &str, key: &str) -> CipherOutput {
    let letters = alphabet::letters(text);
    if letters.is_empty() || key.is_empty() {
        tracing::debug!(direction = direction.as_str(), "empty operand, nothing to do");
        return CipherOutput::empty();
    }

    let matrix = Matrix::from_key(key);
    let pairs = match direction {
        Direction::Encrypt => pairing::pair_for_encrypt(&letters),
        Direction::Decrypt => pairing::pair_for_decrypt(&letters),
    };

    let mut result = String::with_capacity(pairs.len() * 2);
    for pair in &pairs {
        let out = cipher::substitute(&matrix, *pair, direction);
        result.push(out.first.as_char());
        result.push(out.second.as_char());
    }

    tracing::debug!(
        direction = direction.as_str(),
        pairs = pairs.len(),
        "processed message"
    );

    CipherOutput {
        result,
        matrix: Some(matrix),
        pairs,
    }
}

/// Encrypts `plaintext` under `key`.
pub fn encrypt(plaintext: &str, key: &str) -> CipherOutput {
    run(Direction::Encrypt, plaintext, key)
}

/// Decrypts `ciphertext` under `key`.
///
/// The result still contains any padding inserted during encryption.
pub fn decrypt(ciphertext: &str, key: &str) -> CipherOutput {
    run(Direction::Decrypt, ciphertext, key)
}
