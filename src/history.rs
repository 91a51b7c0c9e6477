//! Capacity-bounded operation history
//!
//! The cipher never touches history. The request dispatcher records entries
//! through the [`HistoryStore`] trait, which has an in-memory and a
//! file-backed implementation. Entries are kept oldest first; once capacity
//! is reached the oldest entry is evicted.
//!
//! The file store keeps one JSON file per session and replaces it
//! atomically (tempfile + fsync + rename) on every change.

use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cipher::Direction;
use crate::error::{ErrorCategory, ErrorKind, PlayfairError, Result};

/// Number of entries kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 10;

/// Longest accepted session name.
pub const MAX_SESSION_LEN: usize = 64;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One recorded operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub direction: Direction,
    pub input: String,
    pub output: String,
    pub key: String,
    pub timestamp: String,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current local time.
    pub fn now(
        direction: Direction,
        input: impl Into<String>,
        output: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            direction,
            input: input.into(),
            output: output.into(),
            key: key.into(),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// An in-memory ring of at most `capacity` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    /// Creates an empty history. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a history from entries listed oldest first, keeping the newest
    /// `capacity` of them.
    pub fn from_entries(capacity: usize, entries: Vec<HistoryEntry>) -> Self {
        let mut history = Self::new(capacity);
        for entry in entries {
            history.push(entry);
        }
        history
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Entries, most recent first.
    pub fn recent_first(&self) -> Vec<HistoryEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn oldest_first(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

/// Storage for a session's history.
pub trait HistoryStore {
    /// Records an entry, evicting the oldest one if the store is full.
    fn append(&mut self, entry: HistoryEntry) -> Result<()>;

    /// Returns all entries, most recent first.
    fn list(&self) -> Result<Vec<HistoryEntry>>;

    /// Removes every entry.
    fn clear(&mut self) -> Result<()>;
}

/// Keeps history for the lifetime of the process only.
#[derive(Debug, Clone)]
pub struct MemoryHistoryStore {
    history: History,
}

impl MemoryHistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: History::new(capacity),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append(&mut self, entry: HistoryEntry) -> Result<()> {
        self.history.push(entry);
        Ok(())
    }

    fn list(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.history.recent_first())
    }

    fn clear(&mut self) -> Result<()> {
        self.history.clear();
        Ok(())
    }
}

/// Persists a session's history as a JSON array in `<dir>/<session>.json`.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
    capacity: usize,
}

impl FileHistoryStore {
    /// Opens the store for `session` under `dir`, creating `dir` if needed.
    ///
    /// The file itself is not touched until the first read or write.
    pub fn open(dir: &Path, session: &str, capacity: usize) -> Result<Self> {
        validate_session(session)?;
        fs::create_dir_all(dir).map_err(|e| {
            PlayfairError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("failed to create history directory {}", dir.display()),
                e,
            )
        })?;
        Ok(Self {
            path: dir.join(format!("{}.json", session)),
            capacity,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<History> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(History::new(self.capacity));
            }
            Err(e) => {
                return Err(PlayfairError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    format!("failed to read from {}", self.path.display()),
                    e,
                ));
            }
        };
        let entries: Vec<HistoryEntry> = serde_json::from_slice(&data).map_err(|e| {
            PlayfairError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::HistoryCorrupt,
                format!("history file {} is not valid", self.path.display()),
                e,
            )
        })?;
        if entries.len() > self.capacity {
            tracing::warn!(
                path = %self.path.display(),
                stored = entries.len(),
                capacity = self.capacity,
                "history file exceeds capacity, keeping newest entries"
            );
        }
        Ok(History::from_entries(self.capacity, entries))
    }

    fn save(&self, history: &History) -> Result<()> {
        let entries: Vec<&HistoryEntry> = history.oldest_first().collect();
        let json = serde_json::to_vec_pretty(&entries).map_err(|e| {
            PlayfairError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Serialization,
                "failed to encode history",
                e,
            )
        })?;
        write_atomically(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), entries = entries.len(), "saved history");
        Ok(())
    }
}

impl HistoryStore for FileHistoryStore {
    fn append(&mut self, entry: HistoryEntry) -> Result<()> {
        let mut history = self.load()?;
        history.push(entry);
        self.save(&history)
    }

    fn list(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.load()?.recent_first())
    }

    fn clear(&mut self) -> Result<()> {
        self.save(&History::new(self.capacity))
    }
}

/// Checks that a session name is safe to use as a file name.
pub fn validate_session(session: &str) -> Result<()> {
    let valid = !session.is_empty()
        && session.len() <= MAX_SESSION_LEN
        && session
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(PlayfairError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidSession,
            format!(
                "invalid session name {:?}: use 1-{} letters, digits, '-' or '_'",
                session, MAX_SESSION_LEN
            ),
        ))
    }
}

/// Replaces `path` with `contents` so readers see either the old or the new
/// file, never a partial one.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        PlayfairError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::InternalInvariant,
            "history path has no parent directory",
        )
    })?;
    let mut temp_file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| io_error("failed to create tempfile", e))?;
    temp_file
        .write_all(contents)
        .map_err(|e| io_error("failed to write to tempfile", e))?;
    temp_file
        .flush()
        .map_err(|e| io_error("failed to flush tempfile", e))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| io_error("failed to sync file prior to rename", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = temp_file
            .as_file()
            .metadata()
            .map_err(|e| io_error("failed to get tempfile metadata", e))?
            .permissions();
        perms.set_mode(0o600);
        temp_file
            .as_file()
            .set_permissions(perms)
            .map_err(|e| io_error("failed to set tempfile permissions", e))?;
    }

    temp_file.persist(path).map_err(|e| {
        PlayfairError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn io_error(msg: &str, err: io::Error) -> PlayfairError {
    PlayfairError::with_kind_and_source(ErrorCategory::Internal, ErrorKind::Io, msg, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry {
            direction: Direction::Encrypt,
            input: format!("input {n}"),
            output: format!("output {n}"),
            key: "KEY".to_string(),
            timestamp: "2024-01-01 00:00:00".to_string(),
        }
    }

    fn inputs(entries: &[HistoryEntry]) -> Vec<String> {
        entries.iter().map(|e| e.input.clone()).collect()
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = History::new(3);
        for n in 1..=5 {
            history.push(entry(n));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(
            inputs(&history.recent_first()),
            ["input 5", "input 4", "input 3"]
        );
    }

    #[test]
    fn test_history_zero_capacity_holds_one() {
        let mut history = History::new(0);
        history.push(entry(1));
        history.push(entry(2));
        assert_eq!(history.capacity(), 1);
        assert_eq!(inputs(&history.recent_first()), ["input 2"]);
    }

    #[test]
    fn test_from_entries_keeps_newest() {
        let history = History::from_entries(2, (1..=4).map(entry).collect());
        assert_eq!(inputs(&history.recent_first()), ["input 4", "input 3"]);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryHistoryStore::default();
        for n in 1..=12 {
            store.append(entry(n)).unwrap();
        }
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), DEFAULT_CAPACITY);
        assert_eq!(listed[0].input, "input 12");
        assert_eq!(listed[9].input, "input 3");

        store.clear().unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_entry_now_timestamp_format() {
        let e = HistoryEntry::now(Direction::Decrypt, "a", "b", "c");
        assert!(
            chrono::NaiveDateTime::parse_from_str(&e.timestamp, TIMESTAMP_FORMAT).is_ok(),
            "unexpected timestamp {}",
            e.timestamp
        );
    }

    #[test]
    fn test_entry_json_shape() {
        let json = serde_json::to_value(entry(1)).unwrap();
        assert_eq!(json["type"], "encrypt");
        assert_eq!(json["input"], "input 1");
        assert_eq!(json["timestamp"], "2024-01-01 00:00:00");
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileHistoryStore::open(temp_dir.path(), "alice", 3).unwrap();
        assert!(store.list().unwrap().is_empty());
        assert!(!store.path().exists());

        for n in 1..=4 {
            store.append(entry(n)).unwrap();
        }

        let reopened = FileHistoryStore::open(temp_dir.path(), "alice", 3).unwrap();
        assert_eq!(
            inputs(&reopened.list().unwrap()),
            ["input 4", "input 3", "input 2"]
        );
    }

    #[test]
    fn test_file_store_sessions_are_separate() {
        let temp_dir = TempDir::new().unwrap();
        let mut alice = FileHistoryStore::open(temp_dir.path(), "alice", 10).unwrap();
        let bob = FileHistoryStore::open(temp_dir.path(), "bob", 10).unwrap();
        alice.append(entry(1)).unwrap();
        assert_eq!(alice.list().unwrap().len(), 1);
        assert!(bob.list().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_clear() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileHistoryStore::open(temp_dir.path(), "s", 10).unwrap();
        store.append(entry(1)).unwrap();
        store.clear().unwrap();
        assert!(store.list().unwrap().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap().trim(), "[]");
    }

    #[test]
    fn test_file_store_shrinks_to_smaller_capacity() {
        let temp_dir = TempDir::new().unwrap();
        let mut big = FileHistoryStore::open(temp_dir.path(), "s", 10).unwrap();
        for n in 1..=6 {
            big.append(entry(n)).unwrap();
        }
        let small = FileHistoryStore::open(temp_dir.path(), "s", 2).unwrap();
        assert_eq!(inputs(&small.list().unwrap()), ["input 6", "input 5"]);
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileHistoryStore::open(temp_dir.path(), "s", 10).unwrap();
        fs::write(store.path(), b"{not json").unwrap();
        let err = store.list().expect_err("expected corrupt history error");
        assert_eq!(err.kind, Some(ErrorKind::HistoryCorrupt));
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    #[cfg(unix)]
    fn test_file_store_permissions() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileHistoryStore::open(temp_dir.path(), "s", 10).unwrap();
        store.append(entry(1)).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_validate_session() {
        assert!(validate_session("default").is_ok());
        assert!(validate_session("user_42-b").is_ok());
        for bad in ["", "../etc", "a/b", "has space", "dot.json"] {
            let err = validate_session(bad).expect_err(bad);
            assert_eq!(err.kind, Some(ErrorKind::InvalidSession));
        }
        assert!(validate_session(&"x".repeat(MAX_SESSION_LEN + 1)).is_err());
    }

    #[test]
    fn test_open_rejects_bad_session() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileHistoryStore::open(temp_dir.path(), "../escape", 10).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::InvalidSession));
    }
}
