//! Playfair - the classical digraph substitution cipher
//!
//! The cipher core ([`alphabet`], [`matrix`], [`pairing`], [`cipher`],
//! [`engine`]) is pure and total: every input, including empty or
//! letterless strings, produces a well-formed result. Around it sit a
//! request dispatcher and a capacity-bounded, per-session history store.
//!
//! This is a historical cipher. It offers no meaningful confidentiality.
//!
//! ```
//! let out = playfair::encrypt("HELLO", "MONARCHY");
//! assert_eq!(out.result, "CFSUPM");
//! assert_eq!(playfair::decrypt(&out.result, "MONARCHY").result, "HELXLO");
//! ```

#![forbid(unsafe_code)]

pub mod alphabet;
pub mod cipher;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod history;
pub mod matrix;
pub mod pairing;
pub mod render;

pub use cipher::{Direction, decrypt_pair, encrypt_pair};
pub use engine::{CipherOutput, decrypt, encrypt};
pub use matrix::{Matrix, Position, build_matrix, find_position};
