//! Runtime configuration for the command-line surface

use std::env;
use std::path::PathBuf;

use crate::dispatch::Dispatcher;
use crate::error::{ErrorCategory, ErrorKind, PlayfairError, Result};
use crate::history::{self, DEFAULT_CAPACITY, FileHistoryStore};

/// Session used when none is given.
pub const DEFAULT_SESSION: &str = "default";

/// Name of the history directory created under the home directory.
const HISTORY_DIR_NAME: &str = ".playfair";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding one history file per session.
    pub history_dir: PathBuf,
    pub session: String,
    /// Maximum number of history entries kept per session.
    pub capacity: usize,
    /// Whether encrypt and decrypt record themselves in the history.
    pub record_history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_dir: default_history_dir(),
            session: DEFAULT_SESSION.to_string(),
            capacity: DEFAULT_CAPACITY,
            record_history: true,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(PlayfairError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidConfig,
                "history capacity must be at least 1",
            ));
        }
        history::validate_session(&self.session)
    }

    /// Opens the history store for the configured session.
    pub fn open_store(&self) -> Result<FileHistoryStore> {
        self.validate()?;
        FileHistoryStore::open(&self.history_dir, &self.session, self.capacity)
    }

    /// Builds a dispatcher backed by the configured session's history.
    pub fn dispatcher(&self) -> Result<Dispatcher<FileHistoryStore>> {
        let store = self.open_store()?;
        tracing::debug!(
            session = self.session.as_str(),
            path = %store.path().display(),
            "opened history store"
        );
        Ok(Dispatcher::new(store).record_history(self.record_history))
    }
}

/// `$HOME/.playfair`, or `.playfair` in the working directory if `HOME` is unset.
pub fn default_history_dir() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(HISTORY_DIR_NAME),
        _ => PathBuf::from(HISTORY_DIR_NAME),
    }
}
