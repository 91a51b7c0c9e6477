//! Plain-text rendering for terminal output

use crate::cipher::Direction;
use crate::engine::CipherOutput;
use crate::history::HistoryEntry;
use crate::matrix::Matrix;

/// History input and output longer than this are cut short in listings.
pub const PREVIEW_CHARS: usize = 50;

/// Renders the grid as five space-separated rows.
pub fn matrix(matrix: &Matrix) -> String {
    matrix
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|l| l.as_char().to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn cipher_output(direction: Direction, output: &CipherOutput) -> String {
    let label = match direction {
        Direction::Encrypt => "Ciphertext",
        Direction::Decrypt => "Plaintext",
    };
    let mut out = format!("{}: {}\n", label, output.result);
    if output.is_empty() {
        return out;
    }
    if let Some(m) = &output.matrix {
        out.push_str("\nMatrix:\n");
        for line in matrix(m).lines() {
            out.push_str(&format!("  {}\n", line));
        }
    }
    let pairs: Vec<String> = output.pairs.iter().map(ToString::to_string).collect();
    out.push_str(&format!("\nPairs: {}\n", pairs.join(" ")));
    out
}

pub fn history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history yet\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "[{}] {}  key: {}\n",
            entry.timestamp,
            entry.direction.as_str(),
            entry.key
        ));
        out.push_str(&format!("  input:  {}\n", preview(&entry.input)));
        out.push_str(&format!("  output: {}\n", preview(&entry.output)));
    }
    out
}

/// Cuts `text` to [`PREVIEW_CHARS`] characters, marking the cut with "...".
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
