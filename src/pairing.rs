//! Splitting normalized text into digraphs
//!
//! Encryption and decryption pair differently. Encryption breaks up doubled
//! letters and pads a trailing odd letter with [`PAD`]; decryption takes the
//! text two letters at a time and drops any odd letter left over.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::alphabet::{Letter, PAD};

/// An ordered pair of letters, the unit of substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digraph {
    pub first: Letter,
    pub second: Letter,
}

impl Digraph {
    pub fn new(first: Letter, second: Letter) -> Self {
        Self { first, second }
    }
}

impl fmt::Display for Digraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.first, self.second)
    }
}

/// Serializes as a two-letter string such as `"HE"`.
impl Serialize for Digraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Pairs plaintext for encryption.
///
/// A doubled letter is emitted with the pad and the second copy starts the
/// next digraph. A lone trailing letter is completed with the pad. The pad
/// itself is subject to the doubled-letter rule, so a trailing `X` yields
/// the digraph `XX`.
pub fn pair_for_encrypt(text: &[Letter]) -> Vec<Digraph> {
    let mut pairs = Vec::with_capacity(text.len() / 2 + 1);
    let mut i = 0;
    while i < text.len() {
        let a = text[i];
        let b = text.get(i + 1).copied().unwrap_or(PAD);
        if a == b {
            pairs.push(Digraph::new(a, PAD));
            i += 1;
        } else {
            pairs.push(Digraph::new(a, b));
            i += 2;
        }
    }
    pairs
}

/// Pairs ciphertext for decryption in fixed chunks of two.
///
/// An odd trailing letter is dropped. Ciphertext produced by this crate is
/// always even in length.
pub fn pair_for_decrypt(text: &[Letter]) -> Vec<Digraph> {
    text.chunks_exact(2)
        .map(|chunk| Digraph::new(chunk[0], chunk[1]))
        .collect()
}
