//! The cipher's 25-letter working alphabet and text normalization
//!
//! Every character that reaches the cipher passes through here. Anything that
//! is not an ASCII letter is discarded, letters are uppercased, and J is folded
//! onto I, leaving the 25 letters A-Z minus J.

use std::fmt;

use serde::{Serialize, Serializer};

/// Filler inserted to split a doubled letter or complete a trailing odd letter.
pub const PAD: Letter = Letter(b'X');

/// The working alphabet in ascending order.
pub const ALPHABET: [Letter; 25] = {
    let mut letters = [Letter(b'A'); 25];
    let mut i = 0;
    let mut byte = b'A';
    while byte <= b'Z' {
        if byte != b'J' {
            letters[i] = Letter(byte);
            i += 1;
        }
        byte += 1;
    }
    letters
};

/// A single letter of the working alphabet.
///
/// Holding a `Letter` is proof the value is an uppercase ASCII letter other
/// than J, so matrix lookups on it can never miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter(u8);

impl Letter {
    /// Folds a character into the working alphabet, or returns `None` if it
    /// is not an ASCII letter.
    pub fn from_char(c: char) -> Option<Letter> {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let upper = c.to_ascii_uppercase() as u8;
        Some(Letter(if upper == b'J' { b'I' } else { upper }))
    }

    pub fn as_char(self) -> char {
        self.0 as char
    }

    /// Offset from 'A' in the full 26-letter alphabet.
    pub(crate) fn ordinal(self) -> usize {
        usize::from(self.0 - b'A')
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Serialize for Letter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.as_char())
    }
}

/// Returns the letters of `text` that survive normalization, in order.
pub fn letters(text: &str) -> Vec<Letter> {
    text.chars().filter_map(Letter::from_char).collect()
}

/// Strips non-letters, uppercases, and folds J onto I.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter_map(Letter::from_char)
        .map(Letter::as_char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_skips_j() {
        let s: String = ALPHABET.iter().map(|l| l.as_char()).collect();
        assert_eq!(s, "ABCDEFGHIKLMNOPQRSTUVWXYZ");
    }

    #[test]
    fn test_normalize_strips_and_folds() {
        assert_eq!(normalize("Hello, World!"), "HELLOWORLD");
        assert_eq!(normalize("jumping JACKS"), "IUMPINGIACKS");
        assert_eq!(normalize("  42 \t\n"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_ignores_non_ascii_letters() {
        assert_eq!(normalize("café über"), "CAFBER");
    }

    #[test]
    fn test_from_char() {
        assert_eq!(Letter::from_char('j'), Letter::from_char('I'));
        assert_eq!(Letter::from_char('q').map(Letter::as_char), Some('Q'));
        assert_eq!(Letter::from_char('7'), None);
        assert_eq!(Letter::from_char('é'), None);
    }

    #[test]
    fn test_letter_serializes_as_string() {
        let json = serde_json::to_string(&PAD).unwrap();
        assert_eq!(json, "\"X\"");
    }
}
